//! RGB status LED driver.
//!
//! Three PWM channels drive discrete R/G/B LEDs (or a common-cathode RGB
//! LED).  Colour components are 0–255 and scaled onto each channel.

use embedded_hal::pwm::SetDutyCycle;

use crate::drivers::led_patterns::Rgb;
use crate::error::ActuatorError;

pub struct StatusLed<R, G, B> {
    red: R,
    green: G,
    blue: B,
    current: Rgb,
}

impl<R, G, B> StatusLed<R, G, B>
where
    R: SetDutyCycle,
    G: SetDutyCycle,
    B: SetDutyCycle,
{
    pub fn new(red: R, green: G, blue: B) -> Self {
        Self {
            red,
            green,
            blue,
            current: (0, 0, 0),
        }
    }

    pub fn set_colour(&mut self, r: u8, g: u8, b: u8) -> Result<(), ActuatorError> {
        self.red
            .set_duty_cycle_fraction(u16::from(r), 255)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.green
            .set_duty_cycle_fraction(u16::from(g), 255)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.blue
            .set_duty_cycle_fraction(u16::from(b), 255)
            .map_err(|_| ActuatorError::PwmWriteFailed)?;
        self.current = (r, g, b);
        Ok(())
    }

    pub fn off(&mut self) -> Result<(), ActuatorError> {
        self.set_colour(0, 0, 0)
    }

    pub fn current_colour(&self) -> Rgb {
        self.current
    }
}
