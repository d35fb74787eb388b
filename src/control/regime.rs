//! Belt-speed regime classification.
//!
//! Maps the latest arrival rate (cans/second) onto one of three regimes.
//! The mapping looks inverted for a conveyor but is deliberate: sparse
//! arrivals mean the cans are too far apart, so the belt speeds up to bring
//! them together.
//!
//! | Rate (cans/s)          | Regime | Belt speed |
//! |------------------------|--------|------------|
//! | `< high_below` (0.25)  | High   | 6.16       |
//! | `> low_above` (0.5)    | Low    | 5.04       |
//! | otherwise              | Normal | 5.6        |
//!
//! Both boundaries classify as Normal.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::config::StationConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Regime {
    Normal,
    High,
    Low,
}

impl Regime {
    /// High and Low are abnormal; only they count toward a persistence trip.
    pub fn is_abnormal(self) -> bool {
        !matches!(self, Self::Normal)
    }

    /// Target belt speed for this regime, in configured speed units.
    pub fn target_speed(self, config: &StationConfig) -> f32 {
        match self {
            Self::Normal => config.speed_normal,
            Self::High => config.speed_high,
            Self::Low => config.speed_low,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::High => write!(f, "High"),
            Self::Low => write!(f, "Low"),
        }
    }
}

/// Rate thresholds, lifted out of [`StationConfig`] so classification stays
/// a pure function of two numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeThresholds {
    /// Rates strictly below this classify as High.
    pub high_below: f32,
    /// Rates strictly above this classify as Low.
    pub low_above: f32,
}

impl RegimeThresholds {
    pub fn from_config(config: &StationConfig) -> Self {
        Self {
            high_below: config.rate_high_below_per_sec,
            low_above: config.rate_low_above_per_sec,
        }
    }

    pub fn classify(&self, rate_per_sec: f32) -> Regime {
        if rate_per_sec < self.high_below {
            Regime::High
        } else if rate_per_sec > self.low_above {
            Regime::Low
        } else {
            Regime::Normal
        }
    }
}

impl Default for RegimeThresholds {
    fn default() -> Self {
        Self::from_config(&StationConfig::default())
    }
}
