//! Timing helpers for the iteration driver.
//!
//! Provides an RAII scope that reports its elapsed time through `tracing`
//! when dropped.
use std::time::{Duration, Instant};
use tracing::debug;

/// A profiling scope that measures elapsed time using RAII.
///
/// Time is logged at debug level when dropped.
pub struct ProfilerScope {
    start: Instant,
    name: &'static str,
}

impl ProfilerScope {
    /// Creates a new profiling scope.
    pub fn new(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    /// Gets elapsed time since the scope was opened.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Gets elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ProfilerScope {
    fn drop(&mut self) {
        debug!("{}: {:.3} ms", self.name, self.elapsed_ms());
    }
}
