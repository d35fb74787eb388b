//! Windowed arrival-rate estimator.
//!
//! Counts `CanDetected` arrivals over a fixed sampling window and turns the
//! count into a rate once per window close.  Sub-window timing is discarded
//! on purpose: the classifier only needs a coarse rate, and a counter plus a
//! window length is bounded memory with fixed latency.
//!
//! The estimator also keeps the most recent inter-arrival interval so the
//! display can show an instantaneous can speed.  That value never feeds
//! classification.

/// One rate measurement, produced at window close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    /// Arrivals counted in the window.
    pub arrivals: u32,
    /// Configured window length in milliseconds.
    pub window_ms: u32,
    /// `arrivals / (window_ms / 1000)`.
    pub per_sec: f32,
}

impl RateSample {
    pub fn from_count(arrivals: u32, window_ms: u32) -> Self {
        let window_secs = window_ms as f32 / 1000.0;
        let per_sec = if window_secs > 0.0 {
            arrivals as f32 / window_secs
        } else {
            0.0
        };
        Self {
            arrivals,
            window_ms,
            per_sec,
        }
    }
}

pub struct ArrivalRateEstimator {
    window_ms: u32,
    count: u32,
    windows_closed: u64,
    last_sample: Option<RateSample>,
    last_interval_ms: Option<u32>,
}

impl ArrivalRateEstimator {
    pub fn new(window_ms: u32) -> Self {
        Self {
            window_ms,
            count: 0,
            windows_closed: 0,
            last_sample: None,
            last_interval_ms: None,
        }
    }

    /// Add arrivals drained from the edge latch.  Saturates at `u32::MAX`.
    pub fn record_arrivals(&mut self, arrivals: u32) {
        self.count = self.count.saturating_add(arrivals);
    }

    /// Remember the latest gap between two consecutive arrivals.
    pub fn record_interval(&mut self, interval_ms: u32) {
        if interval_ms > 0 {
            self.last_interval_ms = Some(interval_ms);
        }
    }

    /// Close the current window: compute the rate, reset the counter, and
    /// open the next window.
    pub fn close_window(&mut self) -> RateSample {
        let sample = RateSample::from_count(self.count, self.window_ms);
        self.count = 0;
        self.windows_closed += 1;
        self.last_sample = Some(sample);
        sample
    }

    /// Clear everything accumulated so far (used on re-arm).
    pub fn reset(&mut self) {
        self.count = 0;
        self.last_sample = None;
        self.last_interval_ms = None;
    }

    /// Arrivals counted in the still-open window.
    pub fn pending_count(&self) -> u32 {
        self.count
    }

    pub fn last_sample(&self) -> Option<RateSample> {
        self.last_sample
    }

    pub fn windows_closed(&self) -> u64 {
        self.windows_closed
    }

    /// Instantaneous can speed (m/s) from the last inter-arrival gap.
    pub fn can_speed_mps(&self, spacing_m: f32) -> Option<f32> {
        self.last_interval_ms
            .map(|ms| spacing_m / (ms as f32 / 1000.0))
    }
}
