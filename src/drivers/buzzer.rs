//! Piezo buzzer driver.
//!
//! The buzzer sits on a PWM channel whose frequency is reprogrammed per
//! note; a tone is a 50 % duty square wave at the note frequency, a rest
//! is duty 0.  Playback blocks on the supplied delay for the whole
//! sequence.
//!
//! | Sequence       | Notes                                   | Total   |
//! |----------------|-----------------------------------------|---------|
//! | Startup melody | C5 E5 G5 (120 ms each), C6 (240 ms)     | 600 ms  |
//! | Trip alarm     | 2 kHz / 1 kHz alternating, last held    | 1400 ms |

use embedded_hal::delay::DelayNs;
use embedded_hal::pwm::SetDutyCycle;

use crate::error::ActuatorError;

/// One note.  `hz == 0` is a rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tone {
    pub hz: u32,
    pub ms: u32,
}

impl Tone {
    pub const fn new(hz: u32, ms: u32) -> Self {
        Self { hz, ms }
    }
}

/// Ascending arpeggio played once per arming.
pub const STARTUP_MELODY: [Tone; 4] = [
    Tone::new(523, 120),
    Tone::new(659, 120),
    Tone::new(784, 120),
    Tone::new(1047, 240),
];

/// Two-tone siren played once on entry to critical stop.
pub const TRIP_ALARM: [Tone; 6] = [
    Tone::new(2000, 200),
    Tone::new(1000, 200),
    Tone::new(2000, 200),
    Tone::new(1000, 200),
    Tone::new(2000, 200),
    Tone::new(1000, 400),
];

/// Wall-clock length of a sequence.
pub fn sequence_duration_ms(tones: &[Tone]) -> u32 {
    tones.iter().map(|t| t.ms).sum()
}

/// PWM channels whose output frequency can be reprogrammed.
pub trait PwmFrequency {
    fn set_frequency_hz(&mut self, hz: u32) -> Result<(), ActuatorError>;
}

pub struct Buzzer<P> {
    pwm: P,
}

impl<P> Buzzer<P>
where
    P: SetDutyCycle + PwmFrequency,
{
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }

    /// Play `tones` back to back, then silence the buzzer.
    pub fn play(&mut self, tones: &[Tone], delay: &mut impl DelayNs) -> Result<(), ActuatorError> {
        for tone in tones {
            if tone.hz == 0 {
                self.silence()?;
            } else {
                self.pwm.set_frequency_hz(tone.hz)?;
                self.pwm
                    .set_duty_cycle_percent(50)
                    .map_err(|_| ActuatorError::PwmWriteFailed)?;
            }
            delay.delay_ms(tone.ms);
        }
        self.silence()
    }

    pub fn silence(&mut self) -> Result<(), ActuatorError> {
        self.pwm
            .set_duty_cycle_fully_off()
            .map_err(|_| ActuatorError::PwmWriteFailed)
    }
}
