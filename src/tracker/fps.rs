//! Frame-rate bookkeeping from consecutive timestamps.

use std::time::Instant;

/// Source of wall-clock timestamps for FPS computation.
pub trait Clock {
    fn now(&mut self) -> Instant;
}

/// Clock backed by `Instant::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> Instant {
        Instant::now()
    }
}

/// Integer FPS computed as `floor(1 / dt)` between successive ticks.
///
/// A tick at the same instant as the previous one leaves the value untouched
/// and reports that nothing was refreshed.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    last: Option<Instant>,
    fps: u32,
}

impl FpsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart measurement from `now` with an FPS of zero.
    pub fn start(&mut self, now: Instant) {
        self.last = Some(now);
        self.fps = 0;
    }

    pub fn clear(&mut self) {
        self.last = None;
        self.fps = 0;
    }

    /// Record a tick at `now`.
    ///
    /// Returns `true` when the FPS value was refreshed. The first tick only
    /// anchors the clock and refreshes to zero.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(last) = self.last else {
            self.last = Some(now);
            self.fps = 0;
            return true;
        };

        let dt = now.saturating_duration_since(last);
        if dt.is_zero() {
            return false;
        }

        self.fps = (1.0 / dt.as_secs_f64()).floor() as u32;
        self.last = Some(now);
        true
    }

    #[inline]
    pub fn fps(&self) -> u32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_anchors() {
        let mut counter = FpsCounter::new();
        assert!(counter.tick(Instant::now()));
        assert_eq!(counter.fps(), 0);
    }

    #[test]
    fn test_fps_is_floored() {
        let t0 = Instant::now();
        let mut counter = FpsCounter::new();
        counter.start(t0);

        assert!(counter.tick(t0 + Duration::from_millis(30)));
        assert_eq!(counter.fps(), 33);

        assert!(counter.tick(t0 + Duration::from_millis(30) + Duration::from_millis(400)));
        assert_eq!(counter.fps(), 2);
    }

    #[test]
    fn test_zero_delta_keeps_previous_value() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(250);
        let mut counter = FpsCounter::new();
        counter.start(t0);

        assert!(counter.tick(t1));
        assert_eq!(counter.fps(), 4);

        assert!(!counter.tick(t1));
        assert_eq!(counter.fps(), 4);
    }

    #[test]
    fn test_slow_frames_report_zero() {
        let t0 = Instant::now();
        let mut counter = FpsCounter::new();
        counter.start(t0);

        assert!(counter.tick(t0 + Duration::from_secs(3)));
        assert_eq!(counter.fps(), 0);
    }
}
