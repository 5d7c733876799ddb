//! Momentum scrolling after a fling gesture.
//!
//! Constant deceleration: the offset follows `x(t) = x0 + v*t - sign(v)*d*t^2/2`
//! until the velocity reaches zero or the offset hits a scroll bound.

use std::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Fling {
    from: f32,
    velocity: f32,
    min: f32,
    max: f32,
    started_at: Instant,
    /// Seconds until the velocity reaches zero
    duration: f32,
}

/// Decelerating scroller, the counterpart of a platform fling scroller
#[derive(Debug, Clone)]
pub struct FlingScroller {
    /// Offset units per second squared
    deceleration: f32,
    active: Option<Fling>,
}

impl FlingScroller {
    #[must_use]
    pub const fn new(deceleration: f32) -> Self {
        Self {
            deceleration,
            active: None,
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Start a fling from `from` with `velocity` (offset units per second),
    /// confined to `[min, max]`.
    pub fn start(&mut self, from: f32, velocity: f32, (min, max): (f32, f32), now: Instant) {
        let duration = if self.deceleration > 0.0 {
            velocity.abs() / self.deceleration
        } else {
            0.0
        };
        self.active = Some(Fling {
            from: from.clamp(min, max),
            velocity,
            min,
            max,
            started_at: now,
            duration,
        });
    }

    /// Advance to `now`. Returns the new offset while running; the final tick
    /// returns the resting offset and ends the fling.
    pub fn tick(&mut self, now: Instant) -> Option<f32> {
        let fling = self.active?;
        let elapsed = now
            .saturating_duration_since(fling.started_at)
            .as_secs_f32()
            .min(fling.duration);
        let travelled = fling.velocity * elapsed
            - fling.velocity.signum() * self.deceleration * elapsed * elapsed / 2.0;
        let unclamped = fling.from + travelled;
        let hit_bound = (fling.velocity < 0.0 && unclamped <= fling.min)
            || (fling.velocity > 0.0 && unclamped >= fling.max);

        if elapsed >= fling.duration || hit_bound {
            self.active = None;
        }
        Some(unclamped.clamp(fling.min, fling.max))
    }

    /// Stop immediately, leaving the offset where the last tick put it
    pub fn force_finish(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const MS: Duration = Duration::from_millis(1);

    fn approx(actual: Option<f32>, expected: f32) {
        let actual = actual.unwrap_or(f32::NAN);
        assert!(
            (actual - expected).abs() < 0.01,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_fling_decelerates_to_rest() {
        let t0 = Instant::now();
        let mut scroller = FlingScroller::new(1500.0);
        scroller.start(100.0, 300.0, (0.0, 500.0), t0);

        // Stops after 300 / 1500 = 0.2s, having travelled 300*0.2 - 1500*0.04/2 = 30
        approx(scroller.tick(t0 + MS * 100), 122.5);
        assert!(scroller.is_running());
        approx(scroller.tick(t0 + MS * 200), 130.0);
        assert!(!scroller.is_running());
        assert_eq!(scroller.tick(t0 + MS * 300), None);
    }

    #[test]
    fn test_negative_velocity() {
        let t0 = Instant::now();
        let mut scroller = FlingScroller::new(1500.0);
        scroller.start(100.0, -300.0, (0.0, 500.0), t0);
        approx(scroller.tick(t0 + MS * 500), 70.0);
        assert!(!scroller.is_running());
    }

    #[test]
    fn test_fling_stops_at_bound() {
        let t0 = Instant::now();
        let mut scroller = FlingScroller::new(1500.0);
        scroller.start(190.0, 300.0, (0.0, 200.0), t0);
        approx(scroller.tick(t0 + MS * 150), 200.0);
        assert!(!scroller.is_running());
    }

    #[test]
    fn test_force_finish() {
        let t0 = Instant::now();
        let mut scroller = FlingScroller::new(1500.0);
        scroller.start(0.0, 1_000.0, (-100.0, 100.0), t0);
        scroller.force_finish();
        assert!(!scroller.is_running());
        assert_eq!(scroller.tick(t0 + MS * 10), None);
    }
}
