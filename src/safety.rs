//! Critical-stop supervisor.
//!
//! The supervisor is fed one classified regime per closed window while the
//! belt is armed, and decides whether the abnormal condition has persisted.
//!
//! ## Persistence lifecycle
//!
//! 1. A window classifies as High or Low with nothing recorded: the regime
//!    is recorded and the belt is retargeted (`FirstAbnormal`).
//! 2. The next window classifies as the *same* abnormal regime: the
//!    supervisor latches a `PersistentRegime` trip (`Persistent`).
//! 3. The next window classifies as Normal instead: the record is cleared
//!    (`Recovered`).
//! 4. The next window classifies as the *other* abnormal regime: that
//!    regime replaces the record and the count starts over.
//!
//! Manual stops and critical humidity latch a trip directly through
//! [`TripSupervisor::trip`].  A latched trip is sticky until
//! [`TripSupervisor::rearm`]; further trip requests are no-ops, so the stop
//! sequence runs exactly once per trip.

use crate::control::regime::Regime;
use crate::error::TripReason;
use log::{info, warn};

/// Supervisor decision for one closed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowVerdict {
    /// Normal after Normal, or anything while a trip is latched.
    Steady,
    /// First window of a new abnormal regime.
    FirstAbnormal(Regime),
    /// Back to Normal after an abnormal window.
    Recovered,
    /// Same abnormal regime twice in a row; a trip is now latched.
    Persistent(Regime),
}

#[derive(Debug, Default)]
pub struct TripSupervisor {
    recorded: Option<Regime>,
    latched: Option<TripReason>,
}

impl TripSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one classified window.
    pub fn evaluate_window(&mut self, regime: Regime) -> WindowVerdict {
        if self.latched.is_some() {
            return WindowVerdict::Steady;
        }

        match (self.recorded, regime) {
            (None, Regime::Normal) => WindowVerdict::Steady,
            (Some(_), Regime::Normal) => {
                info!("regime recovered to Normal");
                self.recorded = None;
                WindowVerdict::Recovered
            }
            (Some(prev), r) if prev == r => {
                warn!("{r} regime persisted for two windows");
                self.recorded = None;
                self.latched = Some(TripReason::PersistentRegime(r));
                WindowVerdict::Persistent(r)
            }
            (_, r) => {
                info!("abnormal regime {r} recorded");
                self.recorded = Some(r);
                WindowVerdict::FirstAbnormal(r)
            }
        }
    }

    /// Latch a trip.  Returns `false` when one is already latched.
    pub fn trip(&mut self, reason: TripReason) -> bool {
        if self.latched.is_some() {
            return false;
        }
        warn!("TRIP LATCHED: {reason}");
        self.recorded = None;
        self.latched = Some(reason);
        true
    }

    /// Clear the latch and the abnormal record (operator re-arm).
    pub fn rearm(&mut self) {
        if let Some(reason) = self.latched.take() {
            info!("trip cleared by re-arm (was: {reason})");
        }
        self.recorded = None;
    }

    pub fn latched(&self) -> Option<TripReason> {
        self.latched
    }

    /// Abnormal regime seen on the previous window, if any.
    pub fn recorded(&self) -> Option<Regime> {
        self.recorded
    }
}
