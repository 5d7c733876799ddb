use crate::error::{CoreError, Result};
use crate::source::LyricSource;
use crate::track::LyricLine;
use std::collections::HashMap;
use std::time::Duration;
use tracing::warn;

/// Parsed LRC file containing metadata and synchronized lines
#[derive(Debug, Clone, Default)]
pub struct LrcFile {
    pub metadata: LrcMetadata,
    /// Lines sorted by start time, ties in file order
    pub lines: Vec<LyricLine>,
}

/// LRC metadata from ID tags
#[derive(Debug, Clone, Default)]
pub struct LrcMetadata {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub author: Option<String>,
    pub length: Option<Duration>,
    pub offset: i64, // milliseconds, can be negative
}

impl LrcFile {
    /// Parse an LRC string into an `LrcFile`
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LrcParse` if a timestamp tag such as `[01:2x.00]` is malformed.
    pub fn parse(input: &str) -> Result<Self> {
        let mut metadata = LrcMetadata::default();
        let mut lines = Vec::new();

        for (index, line) in input.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            // Try to parse as ID tag first
            if let Some((tag, value)) = parse_id_tag(line) {
                match tag.to_lowercase().as_str() {
                    "ti" => metadata.title = Some(value),
                    "ar" => metadata.artist = Some(value),
                    "al" => metadata.album = Some(value),
                    "au" => metadata.author = Some(value),
                    "length" => metadata.length = parse_timestamp(&value).map(Duration::from_millis),
                    "offset" => {
                        if let Ok(offset) = value.parse::<i64>() {
                            metadata.offset = offset;
                        }
                    }
                    _ => {} // Ignore unknown tags
                }
                continue;
            }

            let parsed = parse_lyric_line(line).map_err(|reason| CoreError::LrcParse {
                line: index + 1,
                reason,
            })?;
            lines.extend(parsed);
        }

        if metadata.offset != 0 {
            for line in &mut lines {
                line.start_ms = apply_offset(line.start_ms, metadata.offset);
            }
        }

        // Stable: repeated timestamps keep file order
        lines.sort_by_key(|l| l.start_ms);

        Ok(Self { metadata, lines })
    }

    /// Attach translations from `secondary` to every line with the exact same timestamp.
    ///
    /// When the secondary file repeats a timestamp, its last line wins.
    pub fn attach_secondary(&mut self, secondary: &Self) {
        let by_time: HashMap<u64, &str> = secondary
            .lines
            .iter()
            .map(|line| (line.start_ms, line.text.as_str()))
            .collect();

        for line in &mut self.lines {
            if let Some(text) = by_time.get(&line.start_ms) {
                line.secondary = Some((*text).to_string());
            }
        }
    }
}

/// The bundled LRC implementation of [`LyricSource`]
#[derive(Debug, Clone, Copy, Default)]
pub struct LrcSource;

impl LyricSource for LrcSource {
    fn parse(&self, main: &str, secondary: Option<&str>) -> Result<Vec<LyricLine>> {
        let mut lrc = LrcFile::parse(main)?;

        if let Some(secondary) = secondary {
            match LrcFile::parse(secondary) {
                Ok(second) => lrc.attach_secondary(&second),
                // A broken translation should not cost the user the main lyrics
                Err(e) => warn!("Ignoring secondary lyrics: {e}"),
            }
        }

        Ok(lrc.lines)
    }
}

/// Parse an ID tag like [ti:Title] or [ar:Artist]
fn parse_id_tag(line: &str) -> Option<(String, String)> {
    if !line.starts_with('[') || !line.contains(':') {
        return None;
    }

    let end = line.find(']')?;
    let content = &line[1..end];

    if is_timestamp_shaped(content) {
        return None;
    }

    let first_colon = content.find(':')?;
    let tag = &content[..first_colon];
    let value = content[first_colon + 1..].trim().to_string();
    Some((tag.to_string(), value))
}

/// Bracket content that claims to be a timestamp: starts with a digit and has a colon
fn is_timestamp_shaped(content: &str) -> bool {
    content.starts_with(|c: char| c.is_ascii_digit()) && content.contains(':')
}

/// Parse a lyric line like [00:12.34]Hello world or [00:12.34][00:15.67]Same lyrics
///
/// Returns no lines for untimed text and for timed lines with empty text.
fn parse_lyric_line(line: &str) -> std::result::Result<Vec<LyricLine>, String> {
    let mut remaining = line;
    let mut timestamps = Vec::new();

    // Extract all timestamps at the beginning
    while remaining.starts_with('[') {
        let Some(end) = remaining.find(']') else {
            break;
        };
        let bracket_content = &remaining[1..end];
        if !is_timestamp_shaped(bracket_content) {
            break;
        }
        let time = parse_timestamp(bracket_content)
            .ok_or_else(|| format!("malformed timestamp [{bracket_content}]"))?;
        timestamps.push(time);
        remaining = &remaining[end + 1..];
    }

    let text = remaining.trim();
    if timestamps.is_empty() || text.is_empty() {
        return Ok(Vec::new());
    }

    // Create a line for each timestamp (handles multi-timestamp lines)
    Ok(timestamps
        .into_iter()
        .map(|start_ms| LyricLine::new(start_ms, text))
        .collect())
}

/// Parse a timestamp string like "00:12.34", "00:12.345", "00:12" or "00:12:34" into milliseconds
fn parse_timestamp(s: &str) -> Option<u64> {
    let s = s.trim();
    let parts: Vec<&str> = s.split(':').collect();

    match parts.as_slice() {
        [minutes, seconds] => {
            let minutes = parse_digits(minutes)?;
            let (whole, fraction) = match seconds.split_once('.') {
                Some((whole, fraction)) => (whole, Some(fraction)),
                None => (*seconds, None),
            };
            let whole = parse_digits(whole)?;
            let fraction_ms = match fraction {
                Some(fraction) => parse_fraction_ms(fraction)?,
                None => 0,
            };
            to_millis(minutes, whole, fraction_ms)
        }
        [minutes, seconds, hundredths] => {
            // mm:ss:xx (hundredths)
            let minutes = parse_digits(minutes)?;
            let seconds = parse_digits(seconds)?;
            let hundredths = parse_digits(hundredths)?;
            to_millis(minutes, seconds, hundredths.checked_mul(10)?)
        }
        _ => None,
    }
}

/// `None` when the timestamp does not fit in a `u64` of milliseconds
fn to_millis(minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    minutes
        .checked_mul(60_000)?
        .checked_add(seconds.checked_mul(1000)?)?
        .checked_add(millis)
}

fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Fractional seconds to milliseconds: "3" -> 300, "34" -> 340, "345" -> 345.
/// Digits beyond millisecond precision are dropped.
fn parse_fraction_ms(fraction: &str) -> Option<u64> {
    let digits = fraction.get(..fraction.len().min(3))?;
    let value = parse_digits(digits)?;
    if !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(match digits.len() {
        1 => value * 100,
        2 => value * 10,
        _ => value,
    })
}

/// Apply a millisecond offset to a start time (can be negative, saturates at zero)
fn apply_offset(start_ms: u64, offset_ms: i64) -> u64 {
    if offset_ms >= 0 {
        start_ms.saturating_add(offset_ms.unsigned_abs())
    } else {
        start_ms.saturating_sub(offset_ms.unsigned_abs())
    }
}
