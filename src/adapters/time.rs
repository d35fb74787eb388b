//! Host time adapter.
//!
//! Monotonic millisecond timestamps for edge callbacks and a blocking
//! `DelayNs` implementation for ramps, tones and animations, both backed by
//! `std::time`.

use std::thread;
use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Monotonic clock anchored at construction.  Clones share the anchor.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since the anchor, truncated to `u32` (wraps after ~49
    /// days; debounce math uses wrapping subtraction).
    pub fn uptime_ms(&self) -> u32 {
        self.start.elapsed().as_millis() as u32
    }
}

/// `DelayNs` on top of `thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
