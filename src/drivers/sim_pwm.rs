//! In-memory PWM channel for host simulation and tests.
//!
//! Implements `embedded_hal::pwm::SetDutyCycle` with an infallible error
//! and tracks duty and programmed frequency.  A clone shares the same
//! channel state, so a test or the console can observe what the drivers
//! wrote.

use core::convert::Infallible;
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, AtomicU32, Ordering};

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::drivers::buzzer::PwmFrequency;
use crate::error::ActuatorError;

#[derive(Debug, Clone)]
pub struct SimPwm {
    max_duty: u16,
    duty: Arc<AtomicU16>,
    frequency_hz: Arc<AtomicU32>,
    writes: Arc<AtomicU32>,
}

impl SimPwm {
    pub fn new(max_duty: u16) -> Self {
        Self {
            max_duty,
            duty: Arc::new(AtomicU16::new(0)),
            frequency_hz: Arc::new(AtomicU32::new(0)),
            writes: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn duty(&self) -> u16 {
        self.duty.load(Ordering::Relaxed)
    }

    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz.load(Ordering::Relaxed)
    }

    /// Number of duty writes since construction.
    pub fn writes(&self) -> u32 {
        self.writes.load(Ordering::Relaxed)
    }
}

impl ErrorType for SimPwm {
    type Error = Infallible;
}

impl SetDutyCycle for SimPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.duty.store(duty.min(self.max_duty), Ordering::Relaxed);
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

impl PwmFrequency for SimPwm {
    fn set_frequency_hz(&mut self, hz: u32) -> Result<(), ActuatorError> {
        self.frequency_hz.store(hz, Ordering::Relaxed);
        Ok(())
    }
}
