//! Station configuration parameters
//!
//! All tunable parameters for the conveyor station.
//! Defaults are the reference calibration; the host binary can override
//! them from a JSON file and operators can push a new set at runtime.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Full-scale belt duty.  Duty values are expressed in tenths of a percent.
pub const BELT_DUTY_MAX: u16 = 1000;

/// Core station configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationConfig {
    // --- Input ---
    /// Minimum spacing between two accepted edges on one input (ms)
    pub debounce_ms: u32,

    // --- Rate estimation ---
    /// Sampling window length (ms)
    pub window_ms: u32,
    /// Rates strictly below this classify as High (cans/s)
    pub rate_high_below_per_sec: f32,
    /// Rates strictly above this classify as Low (cans/s)
    pub rate_low_above_per_sec: f32,

    // --- Belt ---
    pub speed_high: f32,
    pub speed_normal: f32,
    pub speed_low: f32,
    /// Speed that maps to 100 % duty
    pub belt_full_scale_speed: f32,
    /// Duty change per ramp step (tenths of a percent)
    pub ramp_step_duty: u16,
    /// Wait between ramp steps (ms)
    pub ramp_step_interval_ms: u32,

    // --- Environment ---
    pub humidity_elevated_pct: f32,
    pub humidity_critical_pct: f32,
    /// Raw ADC reading that corresponds to 100 % RH
    pub humidity_adc_max: u16,

    // --- Display ---
    /// Distance between two cans on the belt (m), for the can-speed readout
    pub can_spacing_m: f32,

    // --- Timing ---
    /// Control loop pass interval (ms)
    pub control_loop_interval_ms: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 200,

            window_ms: 6000,
            rate_high_below_per_sec: 0.25,
            rate_low_above_per_sec: 0.5,

            speed_high: 6.16,
            speed_normal: 5.6,
            speed_low: 5.04,
            belt_full_scale_speed: 10.0,
            ramp_step_duty: 4,
            ramp_step_interval_ms: 10,

            humidity_elevated_pct: 60.0,
            humidity_critical_pct: 80.0,
            humidity_adc_max: 4095,

            can_spacing_m: 0.085,

            control_loop_interval_ms: 100, // 10 Hz
        }
    }
}

impl StationConfig {
    /// Check ordering and range invariants.  Invalid values are rejected,
    /// never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms == 0 {
            return Err(ConfigError::ValidationFailed("debounce_ms must be > 0"));
        }
        if self.window_ms < 1000 {
            return Err(ConfigError::ValidationFailed("window_ms must be >= 1000"));
        }
        if !(self.rate_high_below_per_sec >= 0.0
            && self.rate_high_below_per_sec < self.rate_low_above_per_sec)
        {
            return Err(ConfigError::ValidationFailed(
                "rate thresholds must satisfy 0 <= high_below < low_above",
            ));
        }
        if !(self.belt_full_scale_speed > 0.0) {
            return Err(ConfigError::ValidationFailed("belt_full_scale_speed must be > 0"));
        }
        for speed in [self.speed_high, self.speed_normal, self.speed_low] {
            if !(speed > 0.0 && speed <= self.belt_full_scale_speed) {
                return Err(ConfigError::ValidationFailed(
                    "belt speeds must be in (0, full scale]",
                ));
            }
        }
        if self.ramp_step_duty == 0 {
            return Err(ConfigError::ValidationFailed("ramp_step_duty must be > 0"));
        }
        if !(self.humidity_elevated_pct > 0.0
            && self.humidity_elevated_pct < self.humidity_critical_pct
            && self.humidity_critical_pct <= 100.0)
        {
            return Err(ConfigError::ValidationFailed(
                "humidity thresholds must satisfy 0 < elevated < critical <= 100",
            ));
        }
        if self.humidity_adc_max == 0 {
            return Err(ConfigError::ValidationFailed("humidity_adc_max must be > 0"));
        }
        if !(self.can_spacing_m > 0.0) {
            return Err(ConfigError::ValidationFailed("can_spacing_m must be > 0"));
        }
        if self.control_loop_interval_ms == 0 || self.control_loop_interval_ms >= self.window_ms {
            return Err(ConfigError::ValidationFailed(
                "control_loop_interval_ms must be in (0, window_ms)",
            ));
        }
        Ok(())
    }

    /// Belt duty (0..=1000) for a target speed.
    pub fn duty_for_speed(&self, speed: f32) -> u16 {
        if !(speed > 0.0) || !(self.belt_full_scale_speed > 0.0) {
            return 0;
        }
        let duty = (speed / self.belt_full_scale_speed * f32::from(BELT_DUTY_MAX)).round();
        duty.min(f32::from(BELT_DUTY_MAX)) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = StationConfig::default();
        assert_eq!(c.validate(), Ok(()));
        assert!(c.rate_high_below_per_sec < c.rate_low_above_per_sec);
        assert!(c.humidity_elevated_pct < c.humidity_critical_pct);
        assert!(c.speed_low < c.speed_normal && c.speed_normal < c.speed_high);
    }

    #[test]
    fn serde_roundtrip() {
        let c = StationConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: StationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let c: StationConfig = serde_json::from_str(r#"{"window_ms": 3000}"#).unwrap();
        assert_eq!(c.window_ms, 3000);
        assert_eq!(c.debounce_ms, 200);
    }

    #[test]
    fn inverted_rate_thresholds_rejected() {
        let c = StationConfig {
            rate_high_below_per_sec: 0.6,
            ..StationConfig::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::ValidationFailed(_))));
    }

    #[test]
    fn humidity_thresholds_rejected_when_out_of_order() {
        let c = StationConfig {
            humidity_elevated_pct: 85.0,
            ..StationConfig::default()
        };
        assert!(c.validate().is_err());
        let c = StationConfig {
            humidity_critical_pct: 120.0,
            ..StationConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn speed_above_full_scale_rejected() {
        let c = StationConfig {
            speed_high: 12.0,
            ..StationConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn nan_threshold_rejected() {
        let c = StationConfig {
            rate_low_above_per_sec: f32::NAN,
            ..StationConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn regime_speeds_map_to_duty() {
        let c = StationConfig::default();
        assert_eq!(c.duty_for_speed(c.speed_normal), 560);
        assert_eq!(c.duty_for_speed(c.speed_high), 616);
        assert_eq!(c.duty_for_speed(c.speed_low), 504);
        assert_eq!(c.duty_for_speed(0.0), 0);
        assert_eq!(c.duty_for_speed(50.0), BELT_DUTY_MAX);
    }
}
