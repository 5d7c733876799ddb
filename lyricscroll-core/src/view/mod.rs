//! The lyric view engine.
//!
//! [`LyricView`] owns the track, its geometry, the scroll motion and the load
//! coordinator. Every entry point runs on the owning thread; only parsing and
//! fetching happen elsewhere, and their results come back through
//! [`LyricView::poll_loads`] or [`LyricView::wait_for_load`].

mod frame;
mod interaction;

pub use frame::{FrameLine, LineRole, LyricFrame, Point, Rect, TimelineOverlay};
pub use interaction::{Gesture, InteractionMode};

use crate::animator::ScrollAnimator;
use crate::config::{LyricViewConfig, ViewConfig};
use crate::error::{CoreError, Result};
use crate::fling::FlingScroller;
use crate::layout::TextLayoutEngine;
use crate::loader::{LoadCompletion, LoadCoordinator, LoadOutcome, LoadToken};
use crate::offset::OffsetModel;
use crate::resolver::resolve_line;
use crate::style::{Color, Palette};
use crate::time::DurationExt;
use crate::track::{LyricLine, LyricTrack};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const LOG_TARGET: &str = "lyricscroll::view";

/// Decides whether a tap on the seek control should seek playback.
pub trait SeekHandler {
    /// Called with the start time of the centered line. Returning `true`
    /// ends the preview and makes that line current.
    fn on_seek(&mut self, position: Duration) -> bool;
}

impl<F> SeekHandler for F
where
    F: FnMut(Duration) -> bool,
{
    fn on_seek(&mut self, position: Duration) -> bool {
        self(position)
    }
}

/// Outcome of one drained load, as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Applied { lines: usize },
    Failed,
    Superseded,
}

/// Synchronized lyrics view state.
pub struct LyricView {
    track: LyricTrack,
    offsets: OffsetModel,
    animator: ScrollAnimator,
    fling: FlingScroller,
    loader: LoadCoordinator,
    layout: Box<dyn TextLayoutEngine>,
    palette: Palette,
    view: ViewConfig,
    transition: Duration,
    adjust: Duration,
    timeline_keep: Duration,
    label: String,
    width: f32,
    height: f32,
    offset: f32,
    current_line: usize,
    mode: InteractionMode,
    seek_handler: Option<Box<dyn SeekHandler>>,
    tap_listener: Option<Box<dyn FnMut()>>,
    redraw: bool,
}

impl LyricView {
    /// Build a view from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` if the configuration is invalid.
    pub fn new(
        config: &LyricViewConfig,
        layout: Box<dyn TextLayoutEngine>,
        loader: LoadCoordinator,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            track: LyricTrack::new(),
            offsets: OffsetModel::new(config.view.divider_height),
            animator: ScrollAnimator::new(config.animation.easing),
            fling: FlingScroller::new(config.animation.fling_deceleration),
            loader,
            layout,
            palette: Palette::from_config(&config.style)?,
            view: config.view.clone(),
            transition: config.animation.transition(),
            adjust: config.animation.adjust(),
            timeline_keep: config.animation.timeline_keep(),
            label: config.view.empty_label.clone(),
            width: 0.0,
            height: 0.0,
            offset: 0.0,
            current_line: 0,
            mode: InteractionMode::Following,
            seek_handler: None,
            tap_listener: None,
            redraw: true,
        })
    }

    #[must_use]
    pub fn has_track(&self) -> bool {
        !self.track.is_empty()
    }

    #[must_use]
    pub const fn track(&self) -> &LyricTrack {
        &self.track
    }

    #[must_use]
    pub const fn current_line(&self) -> usize {
        self.current_line
    }

    /// Current vertical scroll offset
    #[must_use]
    pub const fn offset(&self) -> f32 {
        self.offset
    }

    #[must_use]
    pub const fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Whether the timeline preview is showing
    #[must_use]
    pub const fn is_previewing(&self) -> bool {
        matches!(
            self.mode,
            InteractionMode::Dragging { previewing: true }
                | InteractionMode::Flinging
                | InteractionMode::Preview { .. }
        )
    }

    /// Line nearest the viewport center at the current offset
    pub fn center_line(&mut self) -> usize {
        self.offsets.center_line(self.offset)
    }

    #[must_use]
    pub const fn palette(&self) -> &Palette {
        &self.palette
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Consume the dirty flag set by anything that changes what is drawn
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    /// Advance playback to `position_ms`.
    ///
    /// Only a change of the resolved line has any effect; while following,
    /// that change animates the viewport to the new line.
    pub fn update_time(&mut self, position_ms: i64, now: Instant) {
        if self.track.is_empty() {
            return;
        }
        let line = resolve_line(self.track.lines(), position_ms);
        if line == self.current_line {
            return;
        }
        self.current_line = line;
        self.redraw = true;
        if self.mode == InteractionMode::Following {
            self.scroll_to_current(self.transition, now);
        }
    }

    pub fn update_position(&mut self, position: Duration, now: Instant) {
        self.update_time(position.as_millis_i64(), now);
    }

    /// Report new layout bounds. A width change re-measures every line; any
    /// change drops an ongoing preview and jumps to the current line.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        let width_changed = width.to_bits() != self.width.to_bits();
        let height_changed = height.to_bits() != self.height.to_bits();
        if !width_changed && !height_changed {
            return;
        }
        self.width = width;
        self.height = height;
        self.offsets.set_viewport_height(height);
        if width_changed {
            self.remeasure();
        }
        self.redraw = true;

        if !self.track.is_empty() {
            self.fling.force_finish();
            self.set_mode(InteractionMode::Following);
            self.jump_to_current();
        }
    }

    /// Enable or disable drag-to-preview.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Configuration` when enabling without a handler.
    pub fn set_draggable(
        &mut self,
        enabled: bool,
        handler: Option<Box<dyn SeekHandler>>,
    ) -> Result<()> {
        if !enabled {
            self.seek_handler = None;
            return Ok(());
        }
        let Some(handler) = handler else {
            return Err(CoreError::Configuration {
                reason: "dragging requires a seek handler".to_string(),
            });
        };
        self.seek_handler = Some(handler);
        Ok(())
    }

    /// Listener for taps that are not seek requests
    pub fn set_tap_listener(&mut self, listener: Option<Box<dyn FnMut()>>) {
        self.tap_listener = listener;
    }

    /// Text shown when no track is loaded
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
        self.redraw = true;
    }

    pub fn set_normal_text_color(&mut self, color: Color) {
        self.palette.normal_text = color;
        self.redraw = true;
    }

    pub fn set_current_text_color(&mut self, color: Color) {
        self.palette.current_text = color;
        self.redraw = true;
    }

    pub fn set_timeline_text_color(&mut self, color: Color) {
        self.palette.timeline_text = color;
        self.redraw = true;
    }

    pub fn set_timeline_color(&mut self, color: Color) {
        self.palette.timeline = color;
        self.redraw = true;
    }

    pub fn set_time_text_color(&mut self, color: Color) {
        self.palette.time_text = color;
        self.redraw = true;
    }

    pub fn set_normal_text_size(&mut self, size: f32) {
        if size > 0.0 {
            self.palette.normal_text_size = size;
            self.redraw = true;
        }
    }

    pub fn set_current_text_size(&mut self, size: f32) {
        if size > 0.0 {
            self.palette.current_text_size = size;
            self.redraw = true;
        }
    }

    /// Parse `main` (plus an optional translation) in the background
    pub fn load_text(&mut self, main: impl Into<String>, secondary: Option<String>) -> LoadToken {
        self.reset();
        self.loader.load_text(main.into(), secondary)
    }

    /// Read and parse lyric files in the background
    pub fn load_files(
        &mut self,
        main: impl Into<PathBuf>,
        secondary: Option<PathBuf>,
    ) -> LoadToken {
        self.reset();
        self.loader.load_files(main.into(), secondary)
    }

    /// Fetch and parse lyrics from `url`; the configured charset applies when
    /// `charset` is `None`
    pub fn load_url(&mut self, url: &str, charset: Option<&str>) -> LoadToken {
        self.reset();
        self.loader.load_url(url, charset)
    }

    /// Install already-parsed lines immediately, superseding pending loads
    pub fn load_lines(&mut self, lines: Vec<LyricLine>) {
        self.reset();
        self.apply_lines(lines);
    }

    /// Apply every load completion that has arrived, without waiting
    pub fn poll_loads(&mut self) -> Vec<LoadStatus> {
        let mut statuses = Vec::new();
        while let Some(completion) = self.loader.try_next() {
            statuses.push(self.finish_load(completion));
        }
        statuses
    }

    /// Wait for the next load completion and apply it if still current
    pub async fn wait_for_load(&mut self) -> Option<LoadStatus> {
        let completion = self.loader.next().await?;
        Some(self.finish_load(completion))
    }

    /// Whether a load request is still outstanding
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Drop the track and every bit of motion and interaction state
    pub fn reset(&mut self) {
        self.animator.cancel();
        self.fling.force_finish();
        self.set_mode(InteractionMode::Following);
        self.loader.invalidate();
        self.track.clear();
        self.offsets.clear_heights();
        self.offset = 0.0;
        self.current_line = 0;
        self.redraw = true;
    }

    /// Stop all motion, the preview timer and in-flight loads. The track is kept.
    pub fn detach(&mut self) {
        self.animator.cancel();
        self.fling.force_finish();
        self.set_mode(InteractionMode::Following);
        self.loader.shutdown();
        debug!(target: LOG_TARGET, "Detached");
    }

    fn finish_load(&mut self, completion: LoadCompletion) -> LoadStatus {
        match self.loader.accept(completion) {
            LoadOutcome::Applied(lines) => {
                let count = lines.len();
                self.apply_lines(lines);
                LoadStatus::Applied { lines: count }
            }
            LoadOutcome::Failed(_) => {
                // Track is already empty since the request reset it
                self.redraw = true;
                LoadStatus::Failed
            }
            LoadOutcome::Superseded => LoadStatus::Superseded,
        }
    }

    fn apply_lines(&mut self, lines: Vec<LyricLine>) {
        self.track.replace(lines);
        self.current_line = 0;
        self.remeasure();
        self.jump_to_current();
        self.redraw = true;
        info!(target: LOG_TARGET, "Loaded {} lyric lines", self.track.len());
    }

    fn remeasure(&mut self) {
        if self.track.is_empty() || self.width <= 0.0 {
            self.offsets.clear_heights();
            return;
        }
        let width = (self.width - 2.0 * self.view.padding).max(0.0);
        let heights = self
            .track
            .lines()
            .iter()
            .map(|line| {
                self.layout
                    .measure(&line.display_text(), width, self.view.alignment)
            })
            .collect();
        self.offsets.set_heights(heights);
    }

    fn jump_to_current(&mut self) {
        self.animator.cancel();
        if let Some(target) = self.offsets.offset_of(self.current_line) {
            self.offset = target;
        }
    }

    fn scroll_to_current(&mut self, duration: Duration, now: Instant) {
        if let Some(target) = self.offsets.offset_of(self.current_line) {
            self.animator
                .animate_to(&mut self.offset, target, duration, now);
            self.redraw = true;
        }
    }

    fn set_mode(&mut self, mode: InteractionMode) {
        if self.mode != mode {
            debug!(target: LOG_TARGET, "{:?} -> {:?}", self.mode, mode);
            self.mode = mode;
            self.redraw = true;
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::layout::{MonospaceLayout, TextAlignment};
    use crate::lrc::LrcSource;
    use std::sync::Arc;
    use tokio::runtime::{Builder, Handle, Runtime};

    /// Every line is the same height regardless of text
    pub(crate) struct FixedLayout(pub f32);

    impl TextLayoutEngine for FixedLayout {
        fn measure(&self, _text: &str, _width: f32, _alignment: TextAlignment) -> f32 {
            self.0
        }
    }

    pub(crate) fn runtime() -> Runtime {
        Builder::new_current_thread().enable_all().build().unwrap()
    }

    /// 300x400 viewport, 20px lines, 10px gap: line `i` sits at offset `200 - 30 * i`
    pub(crate) fn view_with(handle: Handle, starts: &[u64]) -> LyricView {
        let mut config = LyricViewConfig::default();
        config.view.divider_height = 10.0;
        let loader = LoadCoordinator::new(handle, Arc::new(LrcSource));
        let mut view = LyricView::new(&config, Box::new(FixedLayout(20.0)), loader).unwrap();
        view.set_viewport(300.0, 400.0);
        view.load_lines(
            starts
                .iter()
                .map(|&ms| LyricLine::new(ms, format!("line at {ms}")))
                .collect(),
        );
        view
    }

    #[test]
    fn test_load_lines_positions_first_line() {
        let rt = runtime();
        let view = view_with(rt.handle().clone(), &[0, 5000, 12000]);
        assert!(view.has_track());
        assert_eq!(view.current_line(), 0);
        assert_eq!(view.offset(), 200.0);
    }

    #[test]
    fn test_update_time_without_track_is_noop() {
        let rt = runtime();
        let mut view = view_with(rt.handle().clone(), &[]);
        view.take_redraw();
        view.update_time(5000, Instant::now());
        assert!(!view.take_redraw());
        assert_eq!(view.current_line(), 0);
    }

    #[test]
    fn test_lines_loaded_before_width_are_measured_later() {
        let rt = runtime();
        let config = LyricViewConfig::default();
        let loader = LoadCoordinator::new(rt.handle().clone(), Arc::new(LrcSource));
        let mut view = LyricView::new(&config, Box::new(FixedLayout(20.0)), loader).unwrap();
        view.load_lines(vec![LyricLine::new(0, "a"), LyricLine::new(1000, "b")]);
        assert_eq!(view.offset(), 0.0);

        view.set_viewport(300.0, 500.0);
        assert_eq!(view.offset(), 250.0);
    }

    #[test]
    fn test_viewport_change_jumps_to_current_line() {
        let rt = runtime();
        let mut view = view_with(rt.handle().clone(), &[0, 5000, 12000]);
        let t0 = Instant::now();
        view.update_time(6000, t0);
        assert_eq!(view.offset(), 200.0);

        view.set_viewport(300.0, 600.0);
        // 300 - 30, no animation
        assert_eq!(view.offset(), 270.0);
        assert!(!view.tick(t0));
    }

    #[test]
    fn test_width_change_remeasures_lines() {
        let rt = runtime();
        let mut config = LyricViewConfig::default();
        config.view.divider_height = 10.0;
        let loader = LoadCoordinator::new(rt.handle().clone(), Arc::new(LrcSource));
        let layout = MonospaceLayout::new(10.0, 20.0);
        let mut view = LyricView::new(&config, Box::new(layout), loader).unwrap();
        view.set_viewport(300.0, 400.0);
        let text = "a".repeat(20);
        view.load_lines(vec![
            LyricLine::new(0, text.clone()),
            LyricLine::new(5000, text.clone()),
            LyricLine::new(12000, text),
        ]);
        view.update_time(6000, Instant::now());

        // 268px of text width fits the 20 columns on one row
        assert_eq!(view.offsets.height_of(1), Some(20.0));
        assert_eq!(view.offsets.offset_of(1), Some(170.0));

        // 118px wraps them onto two rows
        view.set_viewport(150.0, 400.0);
        assert_eq!(view.offsets.height_of(1), Some(40.0));
        assert_eq!(view.offsets.offset_of(1), Some(150.0));
        assert_eq!(view.current_line(), 1);
        assert_eq!(view.offset(), 150.0);
    }

    #[test]
    fn test_non_finite_geometry_is_rejected() {
        let rt = runtime();
        let mut config = LyricViewConfig::default();
        config.view.divider_height = f32::NAN;
        let loader = LoadCoordinator::new(rt.handle().clone(), Arc::new(LrcSource));
        assert!(matches!(
            LyricView::new(&config, Box::new(FixedLayout(20.0)), loader),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_set_draggable_requires_handler() {
        let rt = runtime();
        let mut view = view_with(rt.handle().clone(), &[0]);
        assert!(matches!(
            view.set_draggable(true, None),
            Err(CoreError::Configuration { .. })
        ));
        assert!(view.set_draggable(true, Some(Box::new(|_: Duration| true))).is_ok());
        assert!(view.set_draggable(false, None).is_ok());
    }

    #[test]
    fn test_reset_clears_track_and_position() {
        let rt = runtime();
        let mut view = view_with(rt.handle().clone(), &[0, 5000, 12000]);
        view.update_time(13000, Instant::now());
        view.reset();
        assert!(!view.has_track());
        assert_eq!(view.current_line(), 0);
        assert_eq!(view.offset(), 0.0);
        assert_eq!(view.mode(), InteractionMode::Following);
    }

    #[test]
    fn test_style_setters_mark_redraw() {
        let rt = runtime();
        let mut view = view_with(rt.handle().clone(), &[0]);
        view.take_redraw();
        view.set_current_text_color(Color::rgba(255, 0, 0, 255));
        assert!(view.take_redraw());
        assert_eq!(view.palette().current_text, Color::rgba(255, 0, 0, 255));

        view.set_normal_text_size(0.0);
        assert!(!view.take_redraw());
        view.set_label("Nothing here");
        assert!(view.take_redraw());
        assert_eq!(view.label(), "Nothing here");
    }

    #[tokio::test]
    async fn test_load_text_applies_through_wait() {
        let mut view = view_with(Handle::current(), &[]);
        view.load_text("[00:01.00]one\n[00:03.00]two", None);
        assert!(view.is_loading());
        assert_eq!(
            view.wait_for_load().await,
            Some(LoadStatus::Applied { lines: 2 })
        );
        assert!(view.has_track());
        assert!(!view.is_loading());
    }

    #[tokio::test]
    async fn test_superseded_text_load_is_discarded() {
        let mut view = view_with(Handle::current(), &[]);
        view.load_text("[00:01.00]first", None);
        view.load_text("[00:01.00]second\n[00:02.00]more", None);

        assert_eq!(view.wait_for_load().await, Some(LoadStatus::Superseded));
        assert_eq!(
            view.wait_for_load().await,
            Some(LoadStatus::Applied { lines: 2 })
        );
        assert_eq!(view.track().lines()[0].text, "second");
    }

    #[tokio::test]
    async fn test_load_request_resets_previous_track() {
        let mut view = view_with(Handle::current(), &[0, 5000]);
        view.load_text("[00:01.00]next", None);
        assert!(!view.has_track());
    }

    #[tokio::test]
    async fn test_failed_load_leaves_empty_state() {
        let mut view = view_with(Handle::current(), &[0, 5000]);
        view.load_text("[0x:01.00]broken", None);
        assert_eq!(view.wait_for_load().await, Some(LoadStatus::Failed));
        assert!(!view.has_track());
        assert_eq!(view.frame().empty_label, Some("No lyrics"));
    }

    #[tokio::test]
    async fn test_oversized_timestamp_load_finishes_empty() {
        let mut view = view_with(Handle::current(), &[]);
        view.load_text("[999999999999999999:00]boom", None);
        let status = tokio::time::timeout(Duration::from_secs(2), view.wait_for_load())
            .await
            .unwrap();
        assert_eq!(status, Some(LoadStatus::Failed));
        assert!(!view.is_loading());
        assert!(!view.has_track());
    }

    #[tokio::test]
    async fn test_reset_discards_in_flight_load() {
        let mut view = view_with(Handle::current(), &[]);
        view.load_text("[00:01.00]late", None);
        view.reset();
        assert_eq!(view.wait_for_load().await, Some(LoadStatus::Superseded));
        assert!(!view.has_track());
    }

    #[tokio::test]
    async fn test_poll_loads_drains_completions() {
        let mut view = view_with(Handle::current(), &[]);
        view.load_text("[00:01.00]one", None);
        let mut statuses = Vec::new();
        for _ in 0..16 {
            tokio::task::yield_now().await;
            statuses = view.poll_loads();
            if !statuses.is_empty() {
                break;
            }
        }
        assert_eq!(statuses, vec![LoadStatus::Applied { lines: 1 }]);
        assert!(view.poll_loads().is_empty());
    }
}
