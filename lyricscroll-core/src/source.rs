//! Collaborators that turn raw lyric content into timed lines.

use crate::error::Result;
use crate::track::LyricLine;
use async_trait::async_trait;

/// Parses raw lyric text into timed lines.
///
/// For bilingual tracks the secondary text must share timestamps with the main
/// text; the engine trusts the merged sequence it is given.
pub trait LyricSource: Send + Sync {
    /// Parse `main` (and optionally `secondary`) into lines.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::LrcParse` when the main text contains malformed timestamps.
    fn parse(&self, main: &str, secondary: Option<&str>) -> Result<Vec<LyricLine>>;
}

/// Fetches lyric text from the network.
///
/// # Example
///
/// ```ignore
/// let fetcher = HttpFetcher::new(&config.network)?;
/// let text = fetcher.fetch("https://example.com/song.lrc", "utf-8").await?;
/// ```
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Get a human-readable name for logs
    fn name(&self) -> &'static str;

    /// Download `url` and decode the body using `charset`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Fetch` on any network or decoding failure.
    async fn fetch(&self, url: &str, charset: &str) -> Result<String>;
}
