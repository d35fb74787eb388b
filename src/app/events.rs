//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use crate::control::rate::RateSample;
use crate::control::regime::Regime;
use crate::error::TripReason;
use crate::fsm::StateId;
use crate::sensors::humidity::HumidityAlert;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The application service has started (carries initial state).
    Started(StateId),

    /// The FSM transitioned between states.
    StateChanged { from: StateId, to: StateId },

    /// A sampling window closed and was classified.
    WindowClosed { sample: RateSample, regime: Regime },

    /// The station entered critical stop.
    Tripped(TripReason),

    /// The belt was armed, or re-armed after a trip.
    Rearmed,

    /// Humidity alert level changed.
    HumidityAlert { percent: f32, alert: HumidityAlert },

    /// Status snapshot, emitted whenever it changes.
    Status(StatusData),
}

/// A point-in-time status snapshot for the display and logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusData {
    pub state: StateId,
    pub armed: bool,
    /// Rate from the last closed window (cans/s).
    pub rate_per_sec: f32,
    /// Regime from the last closed window.
    pub regime: Regime,
    pub target_speed: f32,
    pub belt_duty: u16,
    pub humidity_pct: f32,
    pub humidity_alert: HumidityAlert,
    pub trip_reason: Option<TripReason>,
    /// Instantaneous can speed from the last inter-arrival gap (m/s).
    pub can_speed_mps: Option<f32>,
    pub windows_closed: u64,
}
