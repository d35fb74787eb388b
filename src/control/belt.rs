//! Belt controller.
//!
//! Owns the belt's armed flag, the current target speed, and the last duty
//! commanded.  It never touches hardware: each state change queues a
//! [`SpeedChange`] that the application service drains and writes through
//! the actuator port.
//!
//! Arming and tripping are instantaneous jumps.  Regime changes while armed
//! are ramped.

use crate::control::ramp::SpeedRamp;

/// Pending duty update for the motor driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedChange {
    /// Write this duty immediately.
    Jump(u16),
    /// Step through these duties, waiting one ramp interval between writes.
    Ramp(SpeedRamp),
}

pub struct BeltController {
    armed: bool,
    target_speed: f32,
    duty: u16,
    ramp_step: u16,
    startup_played: bool,
    pending: Option<SpeedChange>,
}

impl BeltController {
    pub fn new(ramp_step: u16) -> Self {
        Self {
            armed: false,
            target_speed: 0.0,
            duty: 0,
            ramp_step,
            startup_played: false,
            pending: None,
        }
    }

    /// Arm the belt at `speed` / `duty`.  Returns `true` when this arming
    /// should play the startup signal (once per transition into armed).
    pub fn arm(&mut self, speed: f32, duty: u16) -> bool {
        if self.armed {
            return false;
        }
        self.armed = true;
        self.target_speed = speed;
        self.duty = duty;
        self.pending = Some(SpeedChange::Jump(duty));
        if self.startup_played {
            return false;
        }
        self.startup_played = true;
        true
    }

    /// Stop the belt.  Returns `false` if it was already stopped.
    pub fn trip(&mut self) -> bool {
        if !self.armed {
            return false;
        }
        self.armed = false;
        self.target_speed = 0.0;
        self.duty = 0;
        self.startup_played = false;
        self.pending = Some(SpeedChange::Jump(0));
        true
    }

    /// Retarget while armed.  Ignored when disarmed or already at `duty`.
    pub fn set_target(&mut self, speed: f32, duty: u16) {
        if !self.armed {
            return;
        }
        self.target_speed = speed;
        if duty == self.duty {
            return;
        }
        let start = self.duty;
        self.duty = duty;
        self.pending = Some(SpeedChange::Ramp(SpeedRamp::new(start, duty, self.ramp_step)));
    }

    pub fn set_ramp_step(&mut self, ramp_step: u16) {
        self.ramp_step = ramp_step;
    }

    pub fn take_change(&mut self) -> Option<SpeedChange> {
        self.pending.take()
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn current_target_speed(&self) -> f32 {
        self.target_speed
    }

    /// Duty the motor will be at once the pending change is applied.
    pub fn duty(&self) -> u16 {
        self.duty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_jumps_and_requests_startup_once() {
        let mut belt = BeltController::new(4);
        assert!(belt.arm(5.6, 560));
        assert_eq!(belt.take_change(), Some(SpeedChange::Jump(560)));
        assert!(!belt.arm(5.6, 560));
        assert!(belt.is_armed());
    }

    #[test]
    fn trip_zeroes_speed_and_is_idempotent() {
        let mut belt = BeltController::new(4);
        belt.arm(5.6, 560);
        belt.take_change();
        assert!(belt.trip());
        assert_eq!(belt.take_change(), Some(SpeedChange::Jump(0)));
        assert_eq!(belt.current_target_speed(), 0.0);
        assert!(!belt.trip());
        assert_eq!(belt.take_change(), None);
    }

    #[test]
    fn rearm_after_trip_plays_startup_again() {
        let mut belt = BeltController::new(4);
        assert!(belt.arm(5.6, 560));
        belt.trip();
        assert!(belt.arm(5.6, 560));
    }

    #[test]
    fn retarget_while_armed_ramps() {
        let mut belt = BeltController::new(4);
        belt.arm(5.6, 560);
        belt.take_change();
        belt.set_target(6.16, 616);
        match belt.take_change() {
            Some(SpeedChange::Ramp(ramp)) => {
                assert_eq!(ramp.start(), 560);
                assert_eq!(ramp.target(), 616);
            }
            other => panic!("expected ramp, got {other:?}"),
        }
        assert_eq!(belt.duty(), 616);
    }

    #[test]
    fn retarget_while_disarmed_is_ignored() {
        let mut belt = BeltController::new(4);
        belt.set_target(6.16, 616);
        assert_eq!(belt.take_change(), None);
        assert_eq!(belt.current_target_speed(), 0.0);
    }

    #[test]
    fn retarget_to_same_duty_queues_nothing() {
        let mut belt = BeltController::new(4);
        belt.arm(5.6, 560);
        belt.take_change();
        belt.set_target(5.6, 560);
        assert_eq!(belt.take_change(), None);
    }
}
