//! Relative-humidity sensor on an analog channel.
//!
//! The raw 12-bit conversion (0–4095) maps linearly onto 0–100 % RH.  Each
//! sample is classified against the elevated and critical thresholds as-is;
//! there is no smoothing, so one critical sample is enough to trip.
//!
//! ## Dual-target design
//!
//! Drivers read through the [`AnalogInput`] trait.  On host/test the
//! [`SimHumidity`] channel reads from a shared `AtomicU16` that the
//! console or a test injects into.

use core::fmt;
use core::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use crate::config::StationConfig;
use crate::error::SensorError;

/// One analog conversion channel.
pub trait AnalogInput {
    fn read_raw(&mut self) -> Result<u16, SensorError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum HumidityAlert {
    #[default]
    Nominal,
    /// At or above the elevated threshold.
    Elevated,
    /// At or above the critical threshold; trips the belt.
    Critical,
}

impl fmt::Display for HumidityAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nominal => write!(f, "OK"),
            Self::Elevated => write!(f, "HIGH"),
            Self::Critical => write!(f, "CRIT"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityReading {
    pub raw: u16,
    pub percent: f32,
    pub alert: HumidityAlert,
}

pub struct HumidityMonitor {
    adc_max: u16,
    elevated_pct: f32,
    critical_pct: f32,
    last: Option<HumidityReading>,
}

impl HumidityMonitor {
    pub fn new(config: &StationConfig) -> Self {
        Self {
            adc_max: config.humidity_adc_max,
            elevated_pct: config.humidity_elevated_pct,
            critical_pct: config.humidity_critical_pct,
            last: None,
        }
    }

    pub fn apply_config(&mut self, config: &StationConfig) {
        self.adc_max = config.humidity_adc_max;
        self.elevated_pct = config.humidity_elevated_pct;
        self.critical_pct = config.humidity_critical_pct;
    }

    /// Convert and classify one raw sample.  Rejects samples above the
    /// converter's full scale; the previous reading is kept in that case.
    pub fn sample(&mut self, raw: u16) -> Result<HumidityReading, SensorError> {
        if raw > self.adc_max {
            return Err(SensorError::OutOfRange);
        }
        let percent = self.raw_to_percent(raw);
        let reading = HumidityReading {
            raw,
            percent,
            alert: self.classify(percent),
        };
        self.last = Some(reading);
        Ok(reading)
    }

    pub fn classify(&self, percent: f32) -> HumidityAlert {
        if percent >= self.critical_pct {
            HumidityAlert::Critical
        } else if percent >= self.elevated_pct {
            HumidityAlert::Elevated
        } else {
            HumidityAlert::Nominal
        }
    }

    pub fn last(&self) -> Option<HumidityReading> {
        self.last
    }

    fn raw_to_percent(&self, raw: u16) -> f32 {
        (f32::from(raw) / f32::from(self.adc_max) * 100.0).clamp(0.0, 100.0)
    }
}

// ── Host simulation channel ──────────────────────────────────

/// Simulated ADC channel backed by a shared atomic.  Clone the handle to
/// inject readings from another thread.
#[derive(Debug, Clone, Default)]
pub struct SimHumidity {
    raw: Arc<AtomicU16>,
}

impl SimHumidity {
    pub fn new(initial_raw: u16) -> Self {
        Self {
            raw: Arc::new(AtomicU16::new(initial_raw)),
        }
    }

    pub fn set_raw(&self, raw: u16) {
        self.raw.store(raw, Ordering::Relaxed);
    }

    /// Inject a reading expressed in percent of full scale.
    pub fn set_percent(&self, percent: f32, adc_max: u16) {
        let raw = (percent.clamp(0.0, 100.0) / 100.0 * f32::from(adc_max)).round();
        self.set_raw(raw as u16);
    }
}

impl AnalogInput for SimHumidity {
    fn read_raw(&mut self) -> Result<u16, SensorError> {
        Ok(self.raw.load(Ordering::Relaxed))
    }
}
