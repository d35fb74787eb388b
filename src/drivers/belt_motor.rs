//! Belt motor driver.
//!
//! Single PWM channel; duty is commanded in tenths of a percent
//! (0–1000) and scaled onto the channel's native range.
//!
//! ## Safety contract
//!
//! The belt must be at zero whenever the station is not armed.  Enforced
//! by the FSM and the application service; this driver is a dumb actuator.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::BELT_DUTY_MAX;
use crate::error::ActuatorError;

pub struct BeltMotor<P> {
    pwm: P,
    duty: u16,
}

impl<P: SetDutyCycle> BeltMotor<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm, duty: 0 }
    }

    pub fn set_duty(&mut self, duty: u16) -> Result<(), ActuatorError> {
        let duty = duty.min(BELT_DUTY_MAX);
        self.pwm
            .set_duty_cycle_fraction(duty, BELT_DUTY_MAX)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.duty = duty;
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), ActuatorError> {
        self.set_duty(0)
    }

    pub fn current_duty(&self) -> u16 {
        self.duty
    }

    pub fn is_running(&self) -> bool {
        self.duty > 0
    }
}
