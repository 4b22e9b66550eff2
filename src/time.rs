//! Animation clock.
//!
//! The host hands the animator a high-resolution timestamp (milliseconds) with
//! every frame. [`AnimationClock`] turns those into elapsed animation time
//! measured from mount, keeps them monotonic, and tracks frame statistics.
//!
//! # Example
//!
//! ```
//! use horizon::time::AnimationClock;
//!
//! let mut clock = AnimationClock::new(1000.0);
//! assert_eq!(clock.tick(1016.0), 16.0);
//! assert_eq!(clock.tick(1032.0), 32.0);
//! assert_eq!(clock.frame(), 2);
//! ```

/// How often the FPS estimate is refreshed (ms).
const FPS_WINDOW_MS: f64 = 500.0;

/// Elapsed-time tracking for one intro presentation.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    /// Host timestamp at mount.
    origin: f64,
    /// Latest accepted timestamp.
    last: f64,
    /// Time between the last two ticks (ms).
    delta: f64,
    /// Ticks since mount.
    frame_count: u64,
    /// Frames per second over the last window.
    fps: f32,
    fps_frame_count: u64,
    fps_window_start: f64,
}

impl AnimationClock {
    /// Start a clock at host timestamp `origin`.
    pub fn new(origin: f64) -> Self {
        Self {
            origin,
            last: origin,
            delta: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_window_start: origin,
        }
    }

    /// Advance to a frame timestamp. Returns elapsed animation time (ms).
    ///
    /// Timestamps earlier than the previous one are treated as the previous
    /// one, so elapsed time never runs backwards.
    pub fn tick(&mut self, timestamp: f64) -> f32 {
        let now = timestamp.max(self.last);
        self.delta = now - self.last;
        self.last = now;
        self.frame_count += 1;

        let window = now - self.fps_window_start;
        if window >= FPS_WINDOW_MS {
            let frames = self.frame_count - self.fps_frame_count;
            self.fps = (frames as f64 * 1000.0 / window) as f32;
            self.fps_frame_count = self.frame_count;
            self.fps_window_start = now;
        }

        self.elapsed()
    }

    /// Elapsed animation time at the latest tick (ms).
    #[inline]
    pub fn elapsed(&self) -> f32 {
        (self.last - self.origin) as f32
    }

    /// Elapsed animation time at an arbitrary host timestamp, clamped at 0.
    #[inline]
    pub fn elapsed_at(&self, timestamp: f64) -> f32 {
        (timestamp - self.origin).max(0.0) as f32
    }

    /// Host timestamp at mount.
    #[inline]
    pub fn origin(&self) -> f64 {
        self.origin
    }

    /// Time between the last two ticks (ms).
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }

    /// Ticks since mount.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Frames per second over the most recent window.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = AnimationClock::new(250.0);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.origin(), 250.0);
    }

    #[test]
    fn test_tick_elapsed_and_delta() {
        let mut clock = AnimationClock::new(0.0);
        assert_eq!(clock.tick(16.0), 16.0);
        assert_eq!(clock.tick(40.0), 40.0);
        assert_eq!(clock.delta(), 24.0);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_never_runs_backwards() {
        let mut clock = AnimationClock::new(0.0);
        clock.tick(100.0);
        assert_eq!(clock.tick(50.0), 100.0);
        assert_eq!(clock.delta(), 0.0);
    }

    #[test]
    fn test_elapsed_at_clamps() {
        let clock = AnimationClock::new(1000.0);
        assert_eq!(clock.elapsed_at(500.0), 0.0);
        assert_eq!(clock.elapsed_at(1500.0), 500.0);
    }

    #[test]
    fn test_fps_estimate() {
        let mut clock = AnimationClock::new(0.0);
        for i in 1..=60 {
            clock.tick(i as f64 * 1000.0 / 60.0);
        }
        assert!((clock.fps() - 60.0).abs() < 1.0);
    }
}
