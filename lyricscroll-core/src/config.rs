use crate::animator::Easing;
use crate::error::{CoreError, Result};
use crate::layout::TextAlignment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LyricViewConfig {
    #[serde(default)]
    pub view: ViewConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub style: StyleConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Vertical gap between consecutive lines
    #[serde(default = "default_divider_height")]
    pub divider_height: f32,
    /// Horizontal padding on both sides of the text
    #[serde(default = "default_padding")]
    pub padding: f32,
    #[serde(default)]
    pub alignment: TextAlignment,
    /// Shown centered when no track is loaded
    #[serde(default = "default_empty_label")]
    pub empty_label: String,
    /// Width of the bands holding the seek control (left) and time label (right)
    #[serde(default = "default_time_label_width")]
    pub time_label_width: f32,
    /// Side of the square seek-control hit region
    #[serde(default = "default_seek_control_size")]
    pub seek_control_size: f32,
}

const fn default_divider_height() -> f32 {
    24.0
}

const fn default_padding() -> f32 {
    16.0
}

fn default_empty_label() -> String {
    "No lyrics".to_string()
}

const fn default_time_label_width() -> f32 {
    64.0
}

const fn default_seek_control_size() -> f32 {
    32.0
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            divider_height: default_divider_height(),
            padding: default_padding(),
            alignment: TextAlignment::default(),
            empty_label: default_empty_label(),
            time_label_width: default_time_label_width(),
            seek_control_size: default_seek_control_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Scroll duration when the current line changes during playback
    #[serde(default = "default_transition_ms")]
    pub transition_ms: i64,
    /// Snap-to-center duration after a drag or fling settles
    #[serde(default = "default_adjust_ms")]
    pub adjust_ms: i64,
    /// How long the preview stays up without interaction
    #[serde(default = "default_timeline_keep_ms")]
    pub timeline_keep_ms: i64,
    #[serde(default)]
    pub easing: Easing,
    /// Fling deceleration in offset units per second squared
    #[serde(default = "default_fling_deceleration")]
    pub fling_deceleration: f32,
}

const fn default_transition_ms() -> i64 {
    1000
}

const fn default_adjust_ms() -> i64 {
    100
}

const fn default_timeline_keep_ms() -> i64 {
    3000
}

const fn default_fling_deceleration() -> f32 {
    1500.0
}

/// Negative durations fall back to the default
fn duration_or(ms: i64, default_ms: i64) -> Duration {
    let ms = if ms < 0 { default_ms } else { ms };
    Duration::from_millis(ms.unsigned_abs())
}

impl AnimationConfig {
    #[must_use]
    pub fn transition(&self) -> Duration {
        duration_or(self.transition_ms, default_transition_ms())
    }

    #[must_use]
    pub fn adjust(&self) -> Duration {
        duration_or(self.adjust_ms, default_adjust_ms())
    }

    #[must_use]
    pub fn timeline_keep(&self) -> Duration {
        duration_or(self.timeline_keep_ms, default_timeline_keep_ms())
    }
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            transition_ms: default_transition_ms(),
            adjust_ms: default_adjust_ms(),
            timeline_keep_ms: default_timeline_keep_ms(),
            easing: Easing::default(),
            fling_deceleration: default_fling_deceleration(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    #[serde(default = "default_normal_text_color")]
    pub normal_text_color: String,
    #[serde(default = "default_current_text_color")]
    pub current_text_color: String,
    #[serde(default = "default_timeline_text_color")]
    pub timeline_text_color: String,
    #[serde(default = "default_timeline_color")]
    pub timeline_color: String,
    #[serde(default = "default_time_text_color")]
    pub time_text_color: String,
    #[serde(default = "default_normal_text_size")]
    pub normal_text_size: f32,
    #[serde(default = "default_current_text_size")]
    pub current_text_size: f32,
    #[serde(default = "default_time_text_size")]
    pub time_text_size: f32,
}

fn default_normal_text_color() -> String {
    "#FFFFFF99".to_string()
}

fn default_current_text_color() -> String {
    "#FFFFFFFF".to_string()
}

fn default_timeline_text_color() -> String {
    "#FFFFFFCC".to_string()
}

fn default_timeline_color() -> String {
    "#FFFFFF33".to_string()
}

fn default_time_text_color() -> String {
    "#FFFFFF99".to_string()
}

const fn default_normal_text_size() -> f32 {
    16.0
}

const fn default_current_text_size() -> f32 {
    18.0
}

const fn default_time_text_size() -> f32 {
    12.0
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            normal_text_color: default_normal_text_color(),
            current_text_color: default_current_text_color(),
            timeline_text_color: default_timeline_text_color(),
            timeline_color: default_timeline_color(),
            time_text_color: default_time_text_color(),
            normal_text_size: default_normal_text_size(),
            current_text_size: default_current_text_size(),
            time_text_size: default_time_text_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Charset used to decode fetched lyrics when the caller gives none
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_charset() -> String {
    "utf-8".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_retries() -> u32 {
    3
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            charset: default_charset(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Also write logs to a file under the cache directory
    #[serde(default)]
    pub enabled: bool,
}

impl LyricViewConfig {
    /// Get the config file path (~/.config/lyricscroll/config.toml)
    #[must_use]
    pub fn config_path() -> PathBuf {
        crate::paths::config_path()
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error on TOML syntax errors or out-of-range values.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ConfigNotFound` if the file does not exist, or a parse/validation error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Load config from the default location, using defaults when no file exists
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read, parsed or validated.
    pub fn load_or_default() -> Result<Self> {
        match Self::load(&Self::config_path()) {
            Err(CoreError::ConfigNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Write the commented template, creating parent directories as needed
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn write_template(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, CONFIG_TEMPLATE)?;
        Ok(())
    }

    /// Reject values the engine cannot work with
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` describing the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(CoreError::Configuration {
                reason: reason.to_string(),
            })
        };
        let lengths = [
            ("view.divider_height", self.view.divider_height),
            ("view.padding", self.view.padding),
            ("view.time_label_width", self.view.time_label_width),
            ("view.seek_control_size", self.view.seek_control_size),
            ("style.normal_text_size", self.style.normal_text_size),
            ("style.current_text_size", self.style.current_text_size),
            ("style.time_text_size", self.style.time_text_size),
        ];
        for (field, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return invalid(&format!("{field} must be a finite, non-negative number"));
            }
        }
        let deceleration = self.animation.fling_deceleration;
        if !deceleration.is_finite() || deceleration <= 0.0 {
            return invalid("animation.fling_deceleration must be a finite, positive number");
        }
        if self.network.charset.trim().is_empty() {
            return invalid("network.charset must not be empty");
        }
        crate::style::Palette::from_config(&self.style).map(|_| ())
    }
}

const CONFIG_TEMPLATE: &str = r##"# lyricscroll configuration
# ~/.config/lyricscroll/config.toml

[view]
divider_height = 24.0
padding = 16.0
alignment = "center"  # "left", "center", "right"
empty_label = "No lyrics"
# Band on the left holding the seek control, mirrored on the right for the time label
time_label_width = 64.0
seek_control_size = 32.0

[animation]
transition_ms = 1000      # scroll to the next line during playback
adjust_ms = 100           # snap to the centered line after dragging
timeline_keep_ms = 3000   # preview auto-dismiss
easing = "linear"         # "linear", "ease_in", "ease_out", "ease_in_out"
fling_deceleration = 1500.0

[style]
normal_text_color = "#FFFFFF99"
current_text_color = "#FFFFFFFF"
timeline_text_color = "#FFFFFFCC"
timeline_color = "#FFFFFF33"
time_text_color = "#FFFFFF99"
normal_text_size = 16.0
current_text_size = 18.0
time_text_size = 12.0

[network]
charset = "utf-8"
timeout_secs = 10
max_retries = 3

[logging]
enabled = false
"##;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config = LyricViewConfig::from_toml_str(CONFIG_TEMPLATE).unwrap();
        assert_eq!(config.view.divider_height, 24.0);
        assert_eq!(config.animation.timeline_keep(), Duration::from_secs(3));
        assert_eq!(config.animation.easing, Easing::Linear);
        assert_eq!(config.view.alignment, TextAlignment::Center);
        assert!(!config.logging.enabled);
    }

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = LyricViewConfig::from_toml_str("").unwrap();
        assert_eq!(config.animation.adjust(), Duration::from_millis(100));
        assert_eq!(config.network.charset, "utf-8");
        assert_eq!(config.view.empty_label, "No lyrics");
    }

    #[test]
    fn test_partial_override() {
        let config = LyricViewConfig::from_toml_str(
            "[animation]\ntransition_ms = 250\neasing = \"ease_out\"\n[view]\nalignment = \"left\"",
        )
        .unwrap();
        assert_eq!(config.animation.transition(), Duration::from_millis(250));
        assert_eq!(config.animation.easing, Easing::EaseOut);
        assert_eq!(config.view.alignment, TextAlignment::Left);
        assert_eq!(config.animation.timeline_keep_ms, 3000);
    }

    #[test]
    fn test_negative_duration_falls_back() {
        let config = LyricViewConfig::from_toml_str("[animation]\ntransition_ms = -5").unwrap();
        assert_eq!(config.animation.transition(), Duration::from_millis(1000));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(
            LyricViewConfig::from_toml_str("[view\n"),
            Err(CoreError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_validation_errors() {
        assert!(matches!(
            LyricViewConfig::from_toml_str("[animation]\nfling_deceleration = 0.0"),
            Err(CoreError::Configuration { .. })
        ));
        assert!(matches!(
            LyricViewConfig::from_toml_str("[style]\ncurrent_text_color = \"red\""),
            Err(CoreError::Configuration { .. })
        ));
        for toml in [
            "[view]\ndivider_height = nan",
            "[view]\npadding = -1.0",
            "[view]\nseek_control_size = inf",
            "[animation]\nfling_deceleration = nan",
            "[style]\ncurrent_text_size = nan",
        ] {
            assert!(
                matches!(
                    LyricViewConfig::from_toml_str(toml),
                    Err(CoreError::Configuration { .. })
                ),
                "{toml} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("lyricscroll-test-missing/config.toml");
        assert!(matches!(
            LyricViewConfig::load(&path),
            Err(CoreError::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_write_template_then_load() {
        let dir = std::env::temp_dir().join(format!("lyricscroll-test-{}", std::process::id()));
        let path = dir.join("config.toml");
        LyricViewConfig::write_template(&path).unwrap();
        let config = LyricViewConfig::load(&path).unwrap();
        assert_eq!(config.network.max_retries, 3);
        let _ = fs::remove_dir_all(&dir);
    }
}
