//! Time management utilities

use std::time::{Duration, Instant};

/// Simple stopwatch for measuring elapsed wall-clock time
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub const fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch, keeping the time accumulated so far
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time.take() {
            self.elapsed += start.elapsed();
        }
    }

    /// Reset the stopwatch to zero
    pub fn reset(&mut self) {
        self.start_time = None;
        self.elapsed = Duration::ZERO;
    }

    /// Restart the stopwatch (reset and start)
    pub fn restart(&mut self) {
        self.reset();
        self.start();
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self
            .start_time
            .map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Whether at least `seconds` have passed since the last (re)start
    pub fn has_elapsed(&self, seconds: f32) -> bool {
        self.elapsed_secs() >= seconds
    }

    /// Check if the stopwatch is currently running
    pub const fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_cooldown_always_elapsed() {
        let stopwatch = Stopwatch::start_new();
        assert!(stopwatch.is_running());
        assert!(stopwatch.has_elapsed(0.0));
    }

    #[test]
    fn test_stop_keeps_accumulated_time() {
        let mut stopwatch = Stopwatch::start_new();
        std::thread::sleep(Duration::from_millis(2));
        stopwatch.stop();
        let frozen = stopwatch.elapsed();

        assert!(!stopwatch.is_running());
        assert!(frozen >= Duration::from_millis(2));
        assert_eq!(stopwatch.elapsed(), frozen);

        stopwatch.start();
        assert!(stopwatch.elapsed() >= frozen);
    }

    #[test]
    fn test_restart_clears_accumulated_time() {
        let mut stopwatch = Stopwatch::start_new();
        stopwatch.restart();
        assert!(!stopwatch.has_elapsed(60.0));

        stopwatch.reset();
        assert!(!stopwatch.is_running());
        assert_eq!(stopwatch.elapsed(), Duration::ZERO);
    }
}
