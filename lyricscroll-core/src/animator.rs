//! Time-based tween that drives the viewport offset toward a target.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Interpolation curve applied to normalized animation progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Tween {
    from: f32,
    to: f32,
    started_at: Instant,
    duration: Duration,
}

impl Tween {
    fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }
}

/// Single-slot scroll animator.
///
/// At most one animation runs at a time. Starting a new one first settles the
/// running one at its interpolated value for `now` (not at its target), then
/// tweens from there.
#[derive(Debug, Clone, Default)]
pub struct ScrollAnimator {
    easing: Easing,
    active: Option<Tween>,
}

impl ScrollAnimator {
    #[must_use]
    pub const fn new(easing: Easing) -> Self {
        Self {
            easing,
            active: None,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Target of the running animation
    #[must_use]
    pub fn target(&self) -> Option<f32> {
        self.active.map(|tween| tween.to)
    }

    /// Start animating `offset` toward `target` over `duration`.
    ///
    /// `offset` is first moved to the running animation's value at `now`, if any.
    pub fn animate_to(&mut self, offset: &mut f32, target: f32, duration: Duration, now: Instant) {
        if let Some(value) = self.sample(now) {
            *offset = value;
        }
        self.active = Some(Tween {
            from: *offset,
            to: target,
            started_at: now,
            duration,
        });
    }

    /// Advance to `now`. Returns the new offset while animating, `None` when idle.
    /// The final tick returns exactly the target and ends the animation.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        let tween = self.active?;
        if tween.progress(now) >= 1.0 {
            self.active = None;
            return Some(tween.to);
        }
        self.sample(now)
    }

    /// Stop the running animation; the offset stays wherever the last tick left it.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    fn sample(&self, now: Instant) -> Option<f32> {
        let tween = self.active?;
        let eased = self.easing.apply(tween.progress(now));
        Some(tween.from + (tween.to - tween.from) * eased)
    }
}
