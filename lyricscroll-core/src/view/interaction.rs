//! Gesture handling and the follow / drag / fling / preview state machine.
//!
//! ```text
//! Following --Down--> Dragging --DragBy--> Dragging(previewing)
//!     ^                   |                      |        \
//!     |                 Up/Cancel              Up/Cancel   Fling
//!     |                   v                      v          v
//!     +-------------- Following        Preview <------- Flinging
//!     |                                   |   (settles)
//!     +---- timeout / accepted seek ------+
//! ```

use super::{LyricView, Point, LOG_TARGET};
use std::time::Instant;
use tracing::debug;

/// Input intents decoded by the host's input layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Finger or button went down on the view
    Down,
    /// Drag by this many offset units; positive scrolls toward earlier lines
    DragBy(f32),
    /// Release with momentum, in offset units per second
    Fling(f32),
    Up,
    Cancel,
    Tap(Point),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionMode {
    /// Viewport tracks the playback line
    Following,
    /// Pointer is down; `previewing` once the viewport has actually moved
    Dragging { previewing: bool },
    /// Momentum scroll after release
    Flinging,
    /// Motion settled on a line; returns to following at `dismiss_at`
    Preview { dismiss_at: Instant },
}

impl InteractionMode {
    /// Short name for logs and status lines
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Following => "following",
            Self::Dragging { .. } => "dragging",
            Self::Flinging => "flinging",
            Self::Preview { .. } => "preview",
        }
    }
}

impl LyricView {
    /// Feed one gesture. Returns whether the view consumed it.
    pub fn handle_gesture(&mut self, gesture: Gesture, now: Instant) -> bool {
        match gesture {
            Gesture::Down => self.on_down(),
            Gesture::DragBy(delta) => self.on_drag(delta),
            Gesture::Fling(velocity) => self.on_fling(velocity, now),
            Gesture::Up | Gesture::Cancel => self.on_release(now),
            Gesture::Tap(point) => self.on_tap(point),
        }
    }

    /// Advance animations, fling and the preview timer to `now`.
    ///
    /// Returns `true` while anything time-driven is still pending, so the host
    /// knows to keep scheduling frames.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.mode == InteractionMode::Flinging {
            if let Some(offset) = self.fling.tick(now) {
                self.offset = offset;
                self.redraw = true;
            }
            if !self.fling.is_running() {
                self.settle(now);
            }
        }

        if let Some(offset) = self.animator.tick(now) {
            self.offset = offset;
            self.redraw = true;
        }

        if let InteractionMode::Preview { dismiss_at } = self.mode {
            if now >= dismiss_at {
                debug!(target: LOG_TARGET, "Preview timed out");
                self.set_mode(InteractionMode::Following);
                self.scroll_to_current(self.transition, now);
            }
        }

        self.animator.is_running()
            || self.fling.is_running()
            || matches!(self.mode, InteractionMode::Preview { .. })
    }

    fn can_drag(&self) -> bool {
        self.seek_handler.is_some() && self.offsets.is_measured(self.track.len())
    }

    fn on_down(&mut self) -> bool {
        if !self.can_drag() {
            return false;
        }
        let previewing = match self.mode {
            InteractionMode::Following => false,
            InteractionMode::Dragging { previewing } => previewing,
            InteractionMode::Flinging | InteractionMode::Preview { .. } => true,
        };
        // Grabbing the view stops whatever was moving it, timer included
        self.animator.cancel();
        self.fling.force_finish();
        self.set_mode(InteractionMode::Dragging { previewing });
        true
    }

    fn on_drag(&mut self, delta: f32) -> bool {
        if !matches!(self.mode, InteractionMode::Dragging { .. }) {
            return false;
        }
        let Some((min, max)) = self.offsets.scroll_bounds() else {
            return false;
        };
        self.offset = (self.offset + delta).clamp(min, max);
        self.set_mode(InteractionMode::Dragging { previewing: true });
        self.redraw = true;
        true
    }

    fn on_fling(&mut self, velocity: f32, now: Instant) -> bool {
        if self.mode == InteractionMode::Following {
            return false;
        }
        let Some(bounds) = self.offsets.scroll_bounds() else {
            return false;
        };
        self.animator.cancel();
        self.fling.start(self.offset, velocity, bounds, now);
        self.set_mode(InteractionMode::Flinging);
        true
    }

    fn on_release(&mut self, now: Instant) -> bool {
        match self.mode {
            InteractionMode::Dragging { previewing: false } => {
                self.set_mode(InteractionMode::Following);
                self.scroll_to_current(self.adjust, now);
                true
            }
            InteractionMode::Dragging { previewing: true } => {
                self.settle(now);
                true
            }
            // A fling delivered before the release keeps running
            InteractionMode::Flinging => true,
            InteractionMode::Following | InteractionMode::Preview { .. } => false,
        }
    }

    /// Snap to the nearest line and (re)start the dismiss timer
    fn settle(&mut self, now: Instant) {
        let center = self.offsets.center_line(self.offset);
        if let Some(target) = self.offsets.offset_of(center) {
            self.animator
                .animate_to(&mut self.offset, target, self.adjust, now);
        }
        self.set_mode(InteractionMode::Preview {
            dismiss_at: now + self.timeline_keep,
        });
    }

    fn on_tap(&mut self, point: Point) -> bool {
        if matches!(self.mode, InteractionMode::Preview { .. })
            && self.seek_control().contains(point)
        {
            if let Some(handler) = self.seek_handler.as_mut() {
                let center = self.offsets.center_line(self.offset);
                if let Some(line) = self.track.get(center) {
                    if handler.on_seek(line.start_time()) {
                        debug!(target: LOG_TARGET, "Seek accepted at line {center}");
                        self.current_line = center;
                        self.set_mode(InteractionMode::Following);
                        self.redraw = true;
                    }
                    return true;
                }
            }
        }

        match self.tap_listener.as_mut() {
            Some(listener) => {
                listener();
                true
            }
            None => false,
        }
    }
}
