//! Mock hardware adapter for integration tests.
//!
//! Records every actuator, alarm and display call so tests can assert on
//! the full output history without touching real PWM channels.  Delays
//! are recorded, never slept.

use conveyor_station::app::events::{AppEvent, StatusData};
use conveyor_station::app::ports::{ActuatorPort, AlarmPort, DisplayPort, EventSink, SensorPort};
use conveyor_station::drivers::buzzer::Tone;
use conveyor_station::drivers::matrix::MatrixPattern;
use conveyor_station::error::{ActuatorError, SensorError};
use conveyor_station::events::{EdgeLatch, SignalSource};
use embedded_hal::delay::DelayNs;
use std::sync::Arc;

// ── Output call record ────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum OutputCall {
    BeltDuty(u16),
    Tones(Vec<Tone>),
    Pattern(MatrixPattern),
    AllOff,
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<OutputCall>,
    pub led: (u8, u8, u8),
    pub shown: Vec<StatusData>,
    pub delayed_ns: u64,
    /// Next humidity conversion; `None` simulates a failed read.
    pub humidity_raw: Option<u16>,
    pub fail_belt_writes: bool,
    /// Edge delivered to the latch while the next tone sequence plays,
    /// the way an operator press lands during a blocking alarm.
    pub edge_during_tones: Option<(Arc<EdgeLatch>, SignalSource, u32)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            led: (0, 0, 0),
            shown: Vec::new(),
            delayed_ns: 0,
            humidity_raw: Some(1638), // 40 %
            fail_belt_writes: false,
            edge_during_tones: None,
        }
    }

    /// Set the humidity reading as a percentage of the default 12-bit scale.
    pub fn set_humidity_pct(&mut self, pct: f32) {
        self.humidity_raw = Some((pct / 100.0 * 4095.0).round() as u16);
    }

    /// Last duty written to the belt, 0 if never written.
    pub fn belt_duty(&self) -> u16 {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                OutputCall::BeltDuty(d) => Some(*d),
                OutputCall::AllOff => Some(0),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn belt_writes(&self) -> Vec<u16> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                OutputCall::BeltDuty(d) => Some(*d),
                _ => None,
            })
            .collect()
    }

    pub fn count_tones(&self, tones: &[Tone]) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, OutputCall::Tones(t) if t.as_slice() == tones))
            .count()
    }

    pub fn count_pattern(&self, pattern: MatrixPattern) -> usize {
        self.calls
            .iter()
            .filter(|c| **c == OutputCall::Pattern(pattern))
            .count()
    }

    pub fn position(&self, call: &OutputCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn clear(&mut self) {
        self.calls.clear();
        self.shown.clear();
        self.delayed_ns = 0;
    }
}

impl Default for MockHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorPort for MockHardware {
    fn read_humidity_raw(&mut self) -> Result<u16, SensorError> {
        self.humidity_raw.ok_or(SensorError::AdcReadFailed)
    }
}

impl ActuatorPort for MockHardware {
    fn set_belt_duty(&mut self, duty: u16) -> Result<(), ActuatorError> {
        if self.fail_belt_writes {
            return Err(ActuatorError::PwmWriteFailed);
        }
        self.calls.push(OutputCall::BeltDuty(duty));
        Ok(())
    }

    fn set_led(&mut self, r: u8, g: u8, b: u8) {
        self.led = (r, g, b);
    }

    fn all_off(&mut self) {
        self.calls.push(OutputCall::AllOff);
    }
}

impl AlarmPort for MockHardware {
    fn play_tones(&mut self, tones: &[Tone]) -> Result<(), ActuatorError> {
        self.calls.push(OutputCall::Tones(tones.to_vec()));
        if let Some((latch, source, at_ms)) = self.edge_during_tones.take() {
            latch.on_edge(source, at_ms);
        }
        Ok(())
    }

    fn play_pattern(&mut self, pattern: MatrixPattern) {
        self.calls.push(OutputCall::Pattern(pattern));
    }
}

impl DisplayPort for MockHardware {
    fn show(&mut self, status: &StatusData) {
        self.shown.push(*status);
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, ns: u32) {
        self.delayed_ns += u64::from(ns);
    }
}

// ── RecordingSink ─────────────────────────────────────────────

pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
