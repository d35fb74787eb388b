//! LED pattern engine with priority-based pattern selection.
//!
//! Generates time-varying RGB values for the status LED. The control loop
//! calls `tick()` each pass, and the engine outputs the RGB tuple to feed
//! into `StatusLed::set_colour()`.
//!
//! ## Priority hierarchy (highest first)
//!
//! 1. **Alarm** — rapid red flash while in critical stop
//! 2. **Warning** — humidity elevated, amber double blink
//! 3. **Station state** — disarmed / armed-normal / armed-tripped-once
//!
//! ## Pattern types
//!
//! | Pattern      | Description                      | Rate   |
//! |-------------|----------------------------------|--------|
//! | Solid        | Constant colour                  | —      |
//! | SlowPulse    | Triangular brightness fade       | 1 Hz   |
//! | FastBlink    | On/off square wave               | 4 Hz   |
//! | Breathing    | Smooth ramp up/down              | 0.5 Hz |
//! | DoubleBlink  | Two quick flashes, then pause    | 1 Hz   |
//! | RapidFlash   | Very fast on/off                 | 8 Hz   |

use crate::fsm::StateId;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// Pattern identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternId {
    Solid,
    SlowPulse,
    FastBlink,
    Breathing,
    DoubleBlink,
    RapidFlash,
    Off,
}

/// A pattern request with colour and type.
#[derive(Debug, Clone, Copy)]
pub struct PatternRequest {
    pub colour: Rgb,
    pub pattern: PatternId,
    pub priority: u8,
}

/// LED pattern engine. Stack-allocated, no heap.
pub struct LedPatternEngine {
    phase_ms: u32,
    active: Option<PatternRequest>,
    state_request: Option<PatternRequest>,
    warning_request: Option<PatternRequest>,
    alarm_request: Option<PatternRequest>,
}

impl Default for LedPatternEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedPatternEngine {
    pub fn new() -> Self {
        Self {
            phase_ms: 0,
            active: None,
            state_request: None,
            warning_request: None,
            alarm_request: None,
        }
    }

    /// Set the station-state layer (priority 3 — lowest).
    pub fn set_state_pattern(&mut self, colour: Rgb, pattern: PatternId) {
        self.state_request = Some(PatternRequest {
            colour,
            pattern,
            priority: 3,
        });
    }

    /// Set the state layer from a station state.
    pub fn show_state(&mut self, state: StateId) {
        let (colour, pattern) = pattern_for_state(state);
        self.set_state_pattern(colour, pattern);
    }

    /// Set or clear the humidity warning (priority 2).
    pub fn set_warning_pattern(&mut self, active: bool) {
        self.warning_request = active.then_some(PatternRequest {
            colour: COLOUR_HUMIDITY,
            pattern: PatternId::DoubleBlink,
            priority: 2,
        });
    }

    /// Set or clear the alarm pattern (priority 1 — highest).
    pub fn set_alarm_pattern(&mut self, active: bool) {
        self.alarm_request = active.then_some(PatternRequest {
            colour: COLOUR_ALARM,
            pattern: PatternId::RapidFlash,
            priority: 1,
        });
    }

    /// Clear all patterns — LED will be off.
    pub fn clear_all(&mut self) {
        self.state_request = None;
        self.warning_request = None;
        self.alarm_request = None;
        self.active = None;
        self.phase_ms = 0;
    }

    /// Advance the pattern phase and return the current RGB output.
    /// `delta_ms` is the time since the last call.
    pub fn tick(&mut self, delta_ms: u32) -> Rgb {
        self.phase_ms = self.phase_ms.wrapping_add(delta_ms);

        let selected = self.select_active();
        let reset_phase = match (&self.active, &selected) {
            (Some(prev), Some(next)) => {
                prev.priority != next.priority || prev.pattern != next.pattern
            }
            (None, Some(_)) => true,
            _ => false,
        };
        if reset_phase {
            self.phase_ms = 0;
        }
        self.active = selected;

        match &self.active {
            Some(req) => self.generate(req.colour, req.pattern),
            None => (0, 0, 0),
        }
    }

    fn select_active(&self) -> Option<PatternRequest> {
        // Priority: alarm (1) > warning (2) > state (3)
        self.alarm_request
            .or(self.warning_request)
            .or(self.state_request)
    }

    fn generate(&self, colour: Rgb, pattern: PatternId) -> Rgb {
        let (r, g, b) = colour;
        match pattern {
            PatternId::Solid => colour,
            PatternId::Off => (0, 0, 0),
            PatternId::SlowPulse => {
                let brightness = Self::triangle_brightness(self.phase_ms, 1000);
                Self::scale(r, g, b, brightness)
            }
            PatternId::FastBlink => {
                let on = (self.phase_ms % 250) < 125;
                if on { colour } else { (0, 0, 0) }
            }
            PatternId::Breathing => {
                let brightness = Self::triangle_brightness(self.phase_ms, 2000);
                Self::scale(r, g, b, brightness)
            }
            PatternId::DoubleBlink => {
                let cycle = self.phase_ms % 1000;
                let on = cycle < 100 || (200..300).contains(&cycle);
                if on { colour } else { (0, 0, 0) }
            }
            PatternId::RapidFlash => {
                let on = (self.phase_ms % 125) < 63;
                if on { colour } else { (0, 0, 0) }
            }
        }
    }

    /// Triangular brightness curve: ramps 0→255→0 over `period_ms`.
    fn triangle_brightness(phase_ms: u32, period_ms: u32) -> u8 {
        let pos = u64::from(phase_ms % period_ms);
        let half = u64::from(period_ms) / 2;
        if pos < half {
            ((pos * 255) / half) as u8
        } else {
            (((u64::from(period_ms) - pos) * 255) / half) as u8
        }
    }

    fn scale(r: u8, g: u8, b: u8, brightness: u8) -> Rgb {
        let br = u16::from(brightness);
        (
            ((u16::from(r) * br) / 255) as u8,
            ((u16::from(g) * br) / 255) as u8,
            ((u16::from(b) * br) / 255) as u8,
        )
    }
}

/// State-layer colour and pattern for each station state.
pub fn pattern_for_state(state: StateId) -> (Rgb, PatternId) {
    match state {
        StateId::Disarmed => (COLOUR_DISARMED, PatternId::Breathing),
        StateId::ArmedNormal => (COLOUR_ARMED, PatternId::Solid),
        StateId::ArmedTrippedOnce => (COLOUR_TRIPPED_ONCE, PatternId::SlowPulse),
        StateId::CriticalStop => (COLOUR_ALARM, PatternId::Solid),
    }
}

// ── Well-known colour constants ──────────────────────────────

pub const COLOUR_DISARMED: Rgb = (0, 60, 255); // Blue
pub const COLOUR_ARMED: Rgb = (0, 255, 50); // Green
pub const COLOUR_TRIPPED_ONCE: Rgb = (255, 200, 0); // Yellow
pub const COLOUR_HUMIDITY: Rgb = (255, 120, 0); // Amber
pub const COLOUR_ALARM: Rgb = (255, 0, 0); // Red
