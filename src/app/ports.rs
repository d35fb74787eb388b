//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (humidity channel, belt motor, buzzer, LED matrix,
//! display, event sinks, config storage) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware directly.
//!
//! All port errors are typed; callers must handle every variant explicitly.

use embedded_hal::delay::DelayNs;

use super::events::StatusData;
use crate::config::StationConfig;
use crate::drivers::buzzer::Tone;
use crate::drivers::matrix::MatrixPattern;
use crate::error::{ActuatorError, SensorError};

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to obtain sensor data.
pub trait SensorPort {
    /// One raw humidity conversion (0 – ADC full scale).
    fn read_humidity_raw(&mut self) -> Result<u16, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port: the domain calls this to command actuators.
pub trait ActuatorPort {
    /// Set belt motor duty (0–1000, 0 = stopped).
    fn set_belt_duty(&mut self, duty: u16) -> Result<(), ActuatorError>;

    /// Set the RGB status LED colour.
    fn set_led(&mut self, r: u8, g: u8, b: u8);

    /// Stop the belt and blank every indicator — safe shutdown.
    fn all_off(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Alarm port (driven adapter: domain → buzzer + LED matrix)
// ───────────────────────────────────────────────────────────────

/// Audible and visual alarm outputs.  Both calls block until the sequence
/// has finished.
pub trait AlarmPort {
    fn play_tones(&mut self, tones: &[Tone]) -> Result<(), ActuatorError>;

    fn play_pattern(&mut self, pattern: MatrixPattern);
}

// ───────────────────────────────────────────────────────────────
// Display port (driven adapter: domain → status display)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    fn show(&mut self, status: &StatusData);
}

/// Everything the service drives during one control-loop pass.
///
/// `DelayNs` paces belt ramps; the same delay provider the alarm outputs
/// block on.
pub trait StationPorts: SensorPort + ActuatorPort + AlarmPort + DisplayPort + DelayNs {}

impl<T> StationPorts for T where T: SensorPort + ActuatorPort + AlarmPort + DisplayPort + DelayNs {}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads station configuration.
///
/// Invalid ranges are rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.
pub trait ConfigPort {
    /// Load configuration.  Returns [`ConfigError::NotFound`] when no
    /// stored configuration exists.
    fn load(&self) -> Result<StationConfig, ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// No config found in storage.
    NotFound,
    /// Stored config failed deserialization.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
