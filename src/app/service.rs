//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the FSM, trip supervisor, rate estimator, humidity
//! monitor and LED pattern engine.  It exposes a clean, hardware-agnostic
//! API.  All I/O flows through port traits injected at call sites, making
//! the entire service testable with mock adapters.
//!
//! ```text
//!   EdgeLatch ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  SensorPort ──▶ │          AppService          │
//!                 │ Estimator · Supervisor · FSM │ ──▶ Actuator / Alarm /
//!                 └──────────────────────────────┘     Display ports
//! ```
//!
//! ## One control pass
//!
//! 1. Drain the edge latch.
//! 2. Count arrivals; play the scan animation if any cans passed.
//! 3. Belt-control request: arm, or trip with `ManualStop`.
//! 4. While armed, sample humidity; critical trips immediately.
//! 5. Window close: rate → regime → supervisor verdict → FSM.  Arming
//!    restarts the window, so the first window evaluated after an arm is
//!    always a full one.
//! 6. Refresh the status LED and, if anything changed, the display.
//!
//! Every FSM input is followed by its outputs (belt write or ramp, alarm,
//! startup signal) before the next input is looked at.  Outputs block; an
//! edge arriving meanwhile waits in the latch for the next pass.

use log::{error, info, warn};

use crate::config::{BELT_DUTY_MAX, StationConfig};
use crate::control::belt::SpeedChange;
use crate::control::rate::ArrivalRateEstimator;
use crate::control::regime::{Regime, RegimeThresholds};
use crate::drivers::buzzer::{STARTUP_MELODY, TRIP_ALARM, sequence_duration_ms};
use crate::drivers::led_patterns::LedPatternEngine;
use crate::drivers::matrix::MatrixPattern;
use crate::error::TripReason;
use crate::events::{EdgeLatch, ToggleRequest};
use crate::fsm::context::{StationContext, StationInput};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::safety::TripSupervisor;
use crate::sensors::humidity::{HumidityAlert, HumidityMonitor};

use super::commands::AppCommand;
use super::events::{AppEvent, StatusData};
use super::ports::{ActuatorPort, ConfigError, EventSink, StationPorts};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: StationContext,
    supervisor: TripSupervisor,
    estimator: ArrivalRateEstimator,
    thresholds: RegimeThresholds,
    humidity: HumidityMonitor,
    leds: LedPatternEngine,
    last_rate: f32,
    last_regime: Regime,
    humidity_pct: f32,
    humidity_alert: HumidityAlert,
    last_poll_ms: Option<u32>,
    last_status: Option<StatusData>,
    /// Set when a re-arm opened a fresh window during the current pass.
    window_restarted: bool,
    pass_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** start the FSM — call [`start`](Self::start) next.
    pub fn new(config: StationConfig) -> Self {
        let estimator = ArrivalRateEstimator::new(config.window_ms);
        let thresholds = RegimeThresholds::from_config(&config);
        let humidity = HumidityMonitor::new(&config);
        let ctx = StationContext::new(config);
        let fsm = Fsm::new(build_state_table(), StateId::Disarmed);

        Self {
            fsm,
            ctx,
            supervisor: TripSupervisor::new(),
            estimator,
            thresholds,
            humidity,
            leds: LedPatternEngine::new(),
            last_rate: 0.0,
            last_regime: Regime::Normal,
            humidity_pct: 0.0,
            humidity_alert: HumidityAlert::Nominal,
            last_poll_ms: None,
            last_status: None,
            window_restarted: false,
            pass_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start the FSM in Disarmed with every output off.
    pub fn start(
        &mut self,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        latch.set_debounce_ms(self.ctx.config.debounce_ms);
        latch.set_armed(false);
        hw.all_off();
        self.fsm.start(&mut self.ctx);
        let state = self.fsm.current_state();
        sink.emit(&AppEvent::Started(state));
        info!("AppService started in {}", state);
        self.refresh_indicators(0, hw, sink);
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one control pass.  `now_ms` is the monotonic time used for LED
    /// pattern phase only; all rate math uses the configured window.
    pub fn poll(
        &mut self,
        latch: &EdgeLatch,
        now_ms: u32,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        self.pass_count += 1;
        self.window_restarted = false;
        let pending = latch.take();

        // 1. Arrivals
        if pending.arrivals > 0 {
            self.estimator.record_arrivals(pending.arrivals);
            if let Some(interval) = pending.last_interval_ms {
                self.estimator.record_interval(interval);
            }
            hw.play_pattern(MatrixPattern::Scan);
        }

        // 2. Belt control
        match pending.toggle {
            Some(ToggleRequest::Arm) => self.request_arm(latch, hw, sink),
            Some(ToggleRequest::Stop) => self.request_trip(TripReason::ManualStop, latch, hw, sink),
            None => {}
        }

        // 3. Environment
        if self.fsm.current_state().is_armed() {
            self.sample_humidity(latch, hw, sink);
        }

        // 4. Window close.  A tick drained before a re-arm in this pass
        // belongs to the old phase.
        if pending.window_closed && !self.window_restarted {
            self.close_window(latch, hw, sink);
        }

        // 5. Indicators
        let delta = self
            .last_poll_ms
            .map_or(0, |last| now_ms.wrapping_sub(last));
        self.last_poll_ms = Some(now_ms);
        self.refresh_indicators(delta, hw, sink);
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (console, automation).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) -> Result<(), ConfigError> {
        match cmd {
            AppCommand::Arm => self.request_arm(latch, hw, sink),
            AppCommand::Stop => self.request_trip(TripReason::ManualStop, latch, hw, sink),
            AppCommand::UpdateConfig(config) => {
                if let Err(e) = config.validate() {
                    warn!("Configuration rejected: {}", e);
                    return Err(e);
                }
                self.apply_config(config, latch);
                info!("Configuration updated at runtime");
            }
        }
        self.refresh_indicators(0, hw, sink);
        Ok(())
    }

    // ── Queries ───────────────────────────────────────────────

    /// Build a status snapshot from the current context.
    pub fn build_status(&self) -> StatusData {
        StatusData {
            state: self.fsm.current_state(),
            armed: self.ctx.belt.is_armed(),
            rate_per_sec: self.last_rate,
            regime: self.last_regime,
            target_speed: self.ctx.belt.current_target_speed(),
            belt_duty: self.ctx.belt.duty(),
            humidity_pct: self.humidity_pct,
            humidity_alert: self.humidity_alert,
            trip_reason: self.supervisor.latched(),
            can_speed_mps: self.estimator.can_speed_mps(self.ctx.config.can_spacing_m),
            windows_closed: self.estimator.windows_closed(),
        }
    }

    /// Current FSM state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn is_armed(&self) -> bool {
        self.ctx.belt.is_armed()
    }

    pub fn current_target_speed(&self) -> f32 {
        self.ctx.belt.current_target_speed()
    }

    /// Latched trip, if the station is in critical stop.
    pub fn trip_reason(&self) -> Option<TripReason> {
        self.supervisor.latched()
    }

    /// Abnormal regime recorded on the last window, if any.
    pub fn recorded_regime(&self) -> Option<Regime> {
        self.supervisor.recorded()
    }

    /// Arrivals counted in the still-open window.
    pub fn pending_arrivals(&self) -> u32 {
        self.estimator.pending_count()
    }

    /// Control passes executed since startup.
    pub fn pass_count(&self) -> u64 {
        self.pass_count
    }

    pub fn config(&self) -> &StationConfig {
        &self.ctx.config
    }

    /// Worst-case time one control pass can spend blocked in outputs.
    ///
    /// A pass can play the scan animation, arm (startup melody and
    /// animation), and then either trip (alarm and trip animation) or ramp
    /// across the full duty range.  A belt-control edge arriving during that
    /// time is latched and handled on the next pass, so this is also the
    /// bound on re-arm latency.
    pub fn max_blocking_output_ms(&self) -> u32 {
        let config = &self.ctx.config;
        let scan = MatrixPattern::Scan.duration_ms();
        let startup =
            sequence_duration_ms(&STARTUP_MELODY) + MatrixPattern::Startup.duration_ms();
        let trip = sequence_duration_ms(&TRIP_ALARM) + MatrixPattern::TripSignal.duration_ms();
        let ramp_steps = u32::from(BELT_DUTY_MAX).div_ceil(u32::from(config.ramp_step_duty.max(1)));
        let ramp = ramp_steps * config.ramp_step_interval_ms;
        scan + startup + trip.max(ramp)
    }

    // ── Internal ──────────────────────────────────────────────

    fn request_arm(
        &mut self,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        if self.fsm.current_state().is_armed() {
            info!("Arm request ignored: already armed");
            return;
        }
        self.dispatch(StationInput::Arm, latch, hw, sink);
    }

    fn request_trip(
        &mut self,
        reason: TripReason,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        if !self.fsm.current_state().is_armed() {
            info!("Trip request ({reason}) ignored: belt not armed");
            return;
        }
        if self.supervisor.trip(reason) {
            self.dispatch(StationInput::Trip(reason), latch, hw, sink);
        }
    }

    fn sample_humidity(
        &mut self,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        let reading = match hw
            .read_humidity_raw()
            .and_then(|raw| self.humidity.sample(raw))
        {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Humidity read failed ({e}); keeping last reading");
                return;
            }
        };

        self.humidity_pct = reading.percent;
        if reading.alert != self.humidity_alert {
            self.humidity_alert = reading.alert;
            sink.emit(&AppEvent::HumidityAlert {
                percent: reading.percent,
                alert: reading.alert,
            });
        }
        if reading.alert == HumidityAlert::Critical {
            self.request_trip(TripReason::Humidity, latch, hw, sink);
        }
    }

    fn close_window(
        &mut self,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        let sample = self.estimator.close_window();
        let regime = self.thresholds.classify(sample.per_sec);
        self.last_rate = sample.per_sec;
        self.last_regime = regime;
        sink.emit(&AppEvent::WindowClosed { sample, regime });

        if self.fsm.current_state().is_armed() {
            let verdict = self.supervisor.evaluate_window(regime);
            self.dispatch(StationInput::Window(verdict), latch, hw, sink);
        }
    }

    /// Feed one input to the FSM and perform the outputs it requested.
    fn dispatch(
        &mut self,
        input: StationInput,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        let prev = self.fsm.current_state();
        self.ctx.input = Some(input);
        self.fsm.tick(&mut self.ctx);
        let next = self.fsm.current_state();
        if next != prev {
            sink.emit(&AppEvent::StateChanged { from: prev, to: next });
        }
        self.apply_outputs(latch, hw, sink);
    }

    fn apply_outputs(
        &mut self,
        latch: &EdgeLatch,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        let requests = self.ctx.requests;
        self.ctx.requests.clear();

        if requests.rearmed {
            self.estimator.reset();
            self.supervisor.rearm();
            self.last_rate = 0.0;
            self.last_regime = Regime::Normal;
            latch.set_armed(true);
            latch.restart_window();
            self.window_restarted = true;
            sink.emit(&AppEvent::Rearmed);
        }
        if requests.trip_alarm {
            latch.set_armed(false);
        }

        // Belt first: a trip must reach zero before the alarm starts.
        if let Some(change) = self.ctx.belt.take_change() {
            self.apply_belt(change, hw);
        }

        if requests.trip_alarm {
            if let Some(reason) = self.supervisor.latched() {
                sink.emit(&AppEvent::Tripped(reason));
            }
            if let Err(e) = hw.play_tones(&TRIP_ALARM) {
                error!("Trip alarm failed: {e}");
            }
            hw.play_pattern(MatrixPattern::TripSignal);
        }
        if requests.startup {
            if let Err(e) = hw.play_tones(&STARTUP_MELODY) {
                error!("Startup melody failed: {e}");
            }
            hw.play_pattern(MatrixPattern::Startup);
        }
    }

    fn apply_belt(&self, change: SpeedChange, hw: &mut impl StationPorts) {
        match change {
            SpeedChange::Jump(duty) => write_belt(hw, duty),
            SpeedChange::Ramp(ramp) => {
                let interval = self.ctx.config.ramp_step_interval_ms;
                for duty in ramp {
                    write_belt(hw, duty);
                    hw.delay_ms(interval);
                }
            }
        }
    }

    fn refresh_indicators(
        &mut self,
        delta_ms: u32,
        hw: &mut impl StationPorts,
        sink: &mut impl EventSink,
    ) {
        let state = self.fsm.current_state();
        self.leds.show_state(state);
        self.leds
            .set_warning_pattern(self.humidity_alert != HumidityAlert::Nominal);
        self.leds.set_alarm_pattern(state == StateId::CriticalStop);
        let (r, g, b) = self.leds.tick(delta_ms);
        hw.set_led(r, g, b);

        let status = self.build_status();
        if self.last_status.as_ref() != Some(&status) {
            hw.show(&status);
            sink.emit(&AppEvent::Status(status));
            self.last_status = Some(status);
        }
    }

    fn apply_config(&mut self, mut config: StationConfig, latch: &EdgeLatch) {
        if config.window_ms != self.ctx.config.window_ms {
            warn!(
                "window_ms change ({} -> {}) needs a restart; keeping {}",
                self.ctx.config.window_ms, config.window_ms, self.ctx.config.window_ms
            );
            config.window_ms = self.ctx.config.window_ms;
        }
        latch.set_debounce_ms(config.debounce_ms);
        self.thresholds = RegimeThresholds::from_config(&config);
        self.humidity.apply_config(&config);
        self.ctx.apply_config(config);
    }
}

fn write_belt(hw: &mut impl ActuatorPort, duty: u16) {
    if let Err(e) = hw.set_belt_duty(duty) {
        error!("Belt write failed (duty {duty}): {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_service_is_disarmed_and_idle() {
        let app = AppService::new(StationConfig::default());
        let status = app.build_status();
        assert_eq!(status.state, StateId::Disarmed);
        assert!(!status.armed);
        assert_eq!(status.belt_duty, 0);
        assert_eq!(status.trip_reason, None);
        assert_eq!(status.windows_closed, 0);
    }

    #[test]
    fn blocking_bound_covers_longest_pass() {
        let app = AppService::new(StationConfig::default());
        // scan 300 + startup (600 + 480) + max(trip 1400 + 900, ramp 250 * 10)
        assert_eq!(app.max_blocking_output_ms(), 300 + 1080 + 2500);
    }

    #[test]
    fn blocking_bound_tracks_ramp_config() {
        let config = StationConfig {
            ramp_step_duty: 50,
            ..StationConfig::default()
        };
        let app = AppService::new(config);
        // Ramp is now 20 * 10 = 200 ms; the trip sequence dominates.
        assert_eq!(app.max_blocking_output_ms(), 300 + 1080 + 2300);
    }
}
