//! Shared mutable context threaded through every FSM handler.
//!
//! `StationContext` is the single struct that state handlers read from and
//! write to: the input being dispatched, the belt controller, config, and
//! the output requests the application service acts on after the tick.
//! Think of it as the "blackboard" in a blackboard architecture.

use crate::config::StationConfig;
use crate::control::belt::BeltController;
use crate::error::TripReason;
use crate::safety::WindowVerdict;

// ---------------------------------------------------------------------------
// Inputs (written by the service before each tick; consumed by the handler)
// ---------------------------------------------------------------------------

/// One input for the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationInput {
    /// Belt control pressed while disarmed, or an `Arm` command.
    Arm,
    /// Immediate trip (manual stop or critical humidity).
    Trip(TripReason),
    /// Supervisor verdict for a closed window.
    Window(WindowVerdict),
}

// ---------------------------------------------------------------------------
// Output requests (written by state handlers; consumed by the service)
// ---------------------------------------------------------------------------

/// Side effects requested by state handlers.  The service performs them
/// after the tick and clears the flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputRequests {
    /// Play the startup melody and animation.
    pub startup: bool,
    /// Play the trip alarm and trip-signal animation.
    pub trip_alarm: bool,
    /// The belt was (re-)armed: counters and history must be reset.
    pub rearmed: bool,
}

impl OutputRequests {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

// ---------------------------------------------------------------------------
// StationContext
// ---------------------------------------------------------------------------

pub struct StationContext {
    /// Input being dispatched.  Taken by the update handler.
    pub input: Option<StationInput>,

    /// Belt armed flag, target speed and pending duty change.
    pub belt: BeltController,

    /// Station configuration (tunable parameters).
    pub config: StationConfig,

    /// Requests for the service to act on after the tick.
    pub requests: OutputRequests,

    /// Why the station is in critical stop.  Cleared on re-arm.
    pub trip_reason: Option<TripReason>,
}

impl StationContext {
    pub fn new(config: StationConfig) -> Self {
        Self {
            input: None,
            belt: BeltController::new(config.ramp_step_duty),
            config,
            requests: OutputRequests::default(),
            trip_reason: None,
        }
    }

    /// Replace the configuration.  Takes effect on the next target change.
    pub fn apply_config(&mut self, config: StationConfig) {
        self.belt.set_ramp_step(config.ramp_step_duty);
        self.config = config;
    }
}
