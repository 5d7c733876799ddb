use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit it and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid configuration: {reason}")]
    Configuration { reason: String },

    // Lyrics errors
    #[error("Failed to parse LRC at line {line}: {reason}")]
    LrcParse { line: usize, reason: String },

    // Network errors
    #[error("Invalid lyrics URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    // Load lifecycle
    #[error("Lyrics load was cancelled")]
    LoadCancelled,

    #[error("Lyrics load task failed: {reason}")]
    LoadTask { reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
