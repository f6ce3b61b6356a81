//! Time source for the control loop
//!
//! Every timer and every sleep in the movement controller goes through
//! [`Clock`], so the loop can be driven deterministically.

use std::time::{Duration, Instant};

/// Monotonic time plus blocking sleep
pub trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&mut self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Clock that only moves when told to
///
/// `sleep` returns immediately after advancing the clock.
#[derive(Debug, Clone, Copy)]
pub struct ManualClock {
    base: Instant,
    elapsed: Duration,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn advance(&mut self, duration: Duration) {
        self.elapsed += duration;
    }

    /// Total time advanced since creation
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed
    }

    fn sleep(&mut self, duration: Duration) {
        self.advance(duration);
    }
}
