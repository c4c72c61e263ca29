//! Interval-expiry primitives driving the controller's periodic behavior.
//!
//! The controller never blocks on a timer; `check` is a plain comparison
//! against elapsed real time. The trait exists so tests and bare-metal hosts
//! can substitute their own clock source.

/// A restartable interval timer.
pub trait IntervalTimer {
    /// Sets the interval and re-arms the timer.
    fn set_interval(&mut self, interval_us: u64);

    fn interval_us(&self) -> u64;

    /// Re-arms the timer: the interval is measured from "now" again.
    fn restart(&mut self);

    /// True once the interval has elapsed since the last restart.
    fn check(&self) -> bool;

    fn check_and_restart(&mut self) -> bool {
        if self.check() {
            self.restart();
            return true;
        }
        false
    }
}

#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
mod monotonic {
    use std::time::{Duration, Instant};

    use super::IntervalTimer;

    /// Interval timer on the monotonic clock, unaffected by NTP or manual
    /// wall-clock adjustments.
    #[derive(Debug, Clone)]
    pub struct MonotonicTimer {
        armed_at: Instant,
        interval: Duration,
    }

    impl MonotonicTimer {
        pub fn new(interval_us: u64) -> Self {
            MonotonicTimer {
                armed_at: Instant::now(),
                interval: Duration::from_micros(interval_us),
            }
        }
    }

    impl IntervalTimer for MonotonicTimer {
        fn set_interval(&mut self, interval_us: u64) {
            self.interval = Duration::from_micros(interval_us);
            self.restart();
        }

        fn interval_us(&self) -> u64 {
            self.interval.as_micros() as u64
        }

        fn restart(&mut self) {
            self.armed_at = Instant::now();
        }

        fn check(&self) -> bool {
            self.armed_at.elapsed() > self.interval
        }
    }

    /// Elapsed-time measurement for diagnostics and pacing.
    #[derive(Debug, Clone)]
    pub struct Stopwatch {
        started_at: Instant,
    }

    impl Stopwatch {
        pub fn new() -> Self {
            Stopwatch { started_at: Instant::now() }
        }

        pub fn restart(&mut self) {
            self.started_at = Instant::now();
        }

        pub fn elapsed_us(&self) -> u64 {
            self.started_at.elapsed().as_micros() as u64
        }
    }

    impl Default for Stopwatch {
        fn default() -> Self {
            Stopwatch::new()
        }
    }
}

#[cfg(all(target_arch = "x86_64", target_os = "linux"))]
pub use monotonic::{MonotonicTimer, Stopwatch};
