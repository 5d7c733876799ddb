pub mod animator;
pub mod config;
pub mod error;
pub mod fling;
pub mod layout;
pub mod loader;
pub mod lrc;
pub mod offset;
pub mod paths;
pub mod resolver;
pub mod source;
pub mod style;
pub mod time;
pub mod track;
pub mod view;

pub use animator::{Easing, ScrollAnimator};
pub use config::{
    AnimationConfig, LoggingConfig, LyricViewConfig, NetworkConfig, StyleConfig, ViewConfig,
};
pub use error::{CoreError, Result};
pub use fling::FlingScroller;
pub use layout::{MonospaceLayout, TextAlignment, TextLayoutEngine};
pub use loader::{LoadCompletion, LoadCoordinator, LoadOutcome, LoadToken};
pub use lrc::{LrcFile, LrcMetadata, LrcSource};
pub use offset::OffsetModel;
pub use paths::{
    config_dir, config_path, log_file_path, CONFIG_DIR_NAME, CONFIG_FILE_NAME, LOG_FILE_NAME,
};
pub use resolver::resolve_line;
pub use source::{ContentFetcher, LyricSource};
pub use style::{Color, Palette};
pub use time::{format_time, DurationExt};
pub use track::{LyricLine, LyricTrack};
pub use view::{
    FrameLine, Gesture, InteractionMode, LineRole, LoadStatus, LyricFrame, LyricView, Point,
    Rect, SeekHandler, TimelineOverlay,
};
