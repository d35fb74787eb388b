//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (operator
//! console, automation) that the [`AppService`](super::service::AppService)
//! interprets and acts upon.  `Arm` and `Stop` mirror the belt-control
//! button.

use crate::config::StationConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    /// Arm the belt, or re-arm after a critical stop.
    Arm,

    /// Manual stop: trip the belt immediately.
    Stop,

    /// Hot-reload configuration.  Rejected if it fails validation.
    UpdateConfig(StationConfig),
}
