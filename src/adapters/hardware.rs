//! Hardware adapter — bridges peripherals to domain port traits.
//!
//! Owns the belt motor, buzzer, status LED, LED matrix, humidity channel,
//! display and the blocking delay, exposing them through [`SensorPort`],
//! [`ActuatorPort`], [`AlarmPort`], [`DisplayPort`] and `DelayNs`.  This is
//! the only module in the system that touches peripherals.  Drivers are
//! generic over `embedded-hal` traits; the host binary plugs in simulation
//! channels.

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;
use log::error;

use crate::app::events::StatusData;
use crate::app::ports::{ActuatorPort, AlarmPort, DisplayPort, SensorPort};
use crate::drivers::belt_motor::BeltMotor;
use crate::drivers::buzzer::{Buzzer, PwmFrequency, Tone};
use crate::drivers::display::StatusDisplay;
use crate::drivers::matrix::{self, LedMatrix, MatrixPattern};
use crate::drivers::status_led::StatusLed;
use crate::error::{ActuatorError, SensorError};
use crate::sensors::humidity::AnalogInput;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<P, Z, L, A, M, D> {
    belt: BeltMotor<P>,
    buzzer: Buzzer<Z>,
    led: StatusLed<L, L, L>,
    humidity: A,
    matrix: M,
    display: StatusDisplay,
    delay: D,
}

impl<P, Z, L, A, M, D> HardwareAdapter<P, Z, L, A, M, D>
where
    P: SetDutyCycle,
    Z: SetDutyCycle + PwmFrequency,
    L: SetDutyCycle,
    A: AnalogInput,
    M: LedMatrix,
    D: DelayNs,
{
    pub fn new(
        belt: BeltMotor<P>,
        buzzer: Buzzer<Z>,
        led: StatusLed<L, L, L>,
        humidity: A,
        matrix: M,
        delay: D,
    ) -> Self {
        Self {
            belt,
            buzzer,
            led,
            humidity,
            matrix,
            display: StatusDisplay::new(),
            delay,
        }
    }

    pub fn belt_duty(&self) -> u16 {
        self.belt.current_duty()
    }

    pub fn matrix(&self) -> &M {
        &self.matrix
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<P, Z, L, A, M, D> SensorPort for HardwareAdapter<P, Z, L, A, M, D>
where
    A: AnalogInput,
{
    fn read_humidity_raw(&mut self) -> Result<u16, SensorError> {
        self.humidity.read_raw()
    }
}

// ── ActuatorPort implementation ───────────────────────────────

impl<P, Z, L, A, M, D> ActuatorPort for HardwareAdapter<P, Z, L, A, M, D>
where
    P: SetDutyCycle,
    Z: SetDutyCycle + PwmFrequency,
    L: SetDutyCycle,
{
    fn set_belt_duty(&mut self, duty: u16) -> Result<(), ActuatorError> {
        self.belt.set_duty(duty)
    }

    fn set_led(&mut self, r: u8, g: u8, b: u8) {
        if let Err(e) = self.led.set_colour(r, g, b) {
            error!("status LED write failed: {e}");
        }
    }

    fn all_off(&mut self) {
        if let Err(e) = self.belt.stop() {
            error!("belt stop failed: {e}");
        }
        if let Err(e) = self.buzzer.silence() {
            error!("buzzer silence failed: {e}");
        }
        if let Err(e) = self.led.off() {
            error!("status LED off failed: {e}");
        }
    }
}

// ── AlarmPort implementation ──────────────────────────────────

impl<P, Z, L, A, M, D> AlarmPort for HardwareAdapter<P, Z, L, A, M, D>
where
    Z: SetDutyCycle + PwmFrequency,
    M: LedMatrix,
    D: DelayNs,
{
    fn play_tones(&mut self, tones: &[Tone]) -> Result<(), ActuatorError> {
        self.buzzer.play(tones, &mut self.delay)
    }

    fn play_pattern(&mut self, pattern: MatrixPattern) {
        matrix::play(&mut self.matrix, pattern, &mut self.delay);
    }
}

// ── DisplayPort implementation ────────────────────────────────

impl<P, Z, L, A, M, D> DisplayPort for HardwareAdapter<P, Z, L, A, M, D> {
    fn show(&mut self, status: &StatusData) {
        self.display.show(status);
    }
}

// ── Blocking delay ────────────────────────────────────────────

impl<P, Z, L, A, M, D> DelayNs for HardwareAdapter<P, Z, L, A, M, D>
where
    D: DelayNs,
{
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }
}
