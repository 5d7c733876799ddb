//! Colors and text sizes handed through to the drawing layer.

use crate::config::StyleConfig;
use crate::error::{CoreError, Result};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    #[must_use]
    pub fn parse_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgba(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::rgba(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    fn from_config(field: &str, hex: &str) -> Result<Self> {
        Self::parse_hex(hex).ok_or_else(|| CoreError::Configuration {
            reason: format!("style.{field}: invalid color {hex:?}"),
        })
    }
}

/// Resolved drawing style
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub normal_text: Color,
    pub current_text: Color,
    /// Highlight of the centered line while previewing
    pub timeline_text: Color,
    /// The horizontal preview guide
    pub timeline: Color,
    /// The `mm:ss` label next to the guide
    pub time_text: Color,
    pub normal_text_size: f32,
    pub current_text_size: f32,
    pub time_text_size: f32,
}

impl Palette {
    /// Validate and resolve every configured color
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` naming the first malformed color.
    pub fn from_config(config: &StyleConfig) -> Result<Self> {
        let normal_text_size = config.normal_text_size;
        Ok(Self {
            normal_text: Color::from_config("normal_text_color", &config.normal_text_color)?,
            current_text: Color::from_config("current_text_color", &config.current_text_color)?,
            timeline_text: Color::from_config("timeline_text_color", &config.timeline_text_color)?,
            timeline: Color::from_config("timeline_color", &config.timeline_color)?,
            time_text: Color::from_config("time_text_color", &config.time_text_color)?,
            // A zero normal size means "same as current"
            normal_text_size: if normal_text_size > 0.0 {
                normal_text_size
            } else {
                config.current_text_size
            },
            current_text_size: config.current_text_size,
            time_text_size: config.time_text_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse_hex("#00FF00"), Some(Color::rgba(0, 255, 0, 255)));
        assert_eq!(Color::parse_hex("11223344"), Some(Color::rgba(0x11, 0x22, 0x33, 0x44)));
        assert_eq!(Color::parse_hex("#FFF"), None);
        assert_eq!(Color::parse_hex("#GG0000"), None);
        assert_eq!(Color::parse_hex("#ÿÿÿ"), None);
    }

    #[test]
    fn test_palette_from_default_config() {
        let palette = Palette::from_config(&StyleConfig::default()).unwrap();
        assert_eq!(palette.current_text, Color::rgba(255, 255, 255, 255));
    }

    #[test]
    fn test_palette_rejects_bad_color() {
        let config = StyleConfig {
            timeline_color: "blue".to_string(),
            ..StyleConfig::default()
        };
        assert!(matches!(
            Palette::from_config(&config),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_zero_normal_size_follows_current() {
        let config = StyleConfig {
            normal_text_size: 0.0,
            current_text_size: 20.0,
            ..StyleConfig::default()
        };
        let palette = Palette::from_config(&config).unwrap();
        assert_eq!(palette.normal_text_size, 20.0);
    }
}
