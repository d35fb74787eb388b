//! Integration tests for the EdgeLatch → AppService → outputs pipeline.
//!
//! These run on the host and drive the station the way the firmware loop
//! does: edges and window ticks land in the latch, `poll` drains them, and
//! every output is observed on the mock adapter.

use conveyor_station::app::commands::AppCommand;
use conveyor_station::app::events::AppEvent;
use conveyor_station::app::ports::ConfigError;
use conveyor_station::app::service::AppService;
use conveyor_station::config::StationConfig;
use conveyor_station::control::regime::Regime;
use conveyor_station::drivers::buzzer::{STARTUP_MELODY, TRIP_ALARM};
use conveyor_station::drivers::matrix::MatrixPattern;
use conveyor_station::error::TripReason;
use conveyor_station::events::{EdgeLatch, SignalSource};
use conveyor_station::fsm::StateId;
use conveyor_station::sensors::humidity::HumidityAlert;
use std::sync::Arc;

use super::mock_hw::{MockHardware, OutputCall, RecordingSink};

// ── Harness ───────────────────────────────────────────────────

struct Station {
    app: AppService,
    latch: Arc<EdgeLatch>,
    hw: MockHardware,
    sink: RecordingSink,
    now_ms: u32,
}

impl Station {
    fn new() -> Self {
        Self::with_config(StationConfig::default())
    }

    fn with_config(config: StationConfig) -> Self {
        let latch = Arc::new(EdgeLatch::new(config.debounce_ms));
        let mut station = Self {
            app: AppService::new(config),
            latch,
            hw: MockHardware::new(),
            sink: RecordingSink::new(),
            now_ms: 1_000,
        };
        station
            .app
            .start(&station.latch, &mut station.hw, &mut station.sink);
        station
    }

    /// One edge, spaced past the debounce window from the previous one.
    fn edge(&mut self, source: SignalSource) -> bool {
        self.now_ms += 250;
        self.latch.on_edge(source, self.now_ms)
    }

    fn poll(&mut self) {
        self.now_ms += 100;
        self.app
            .poll(&self.latch, self.now_ms, &mut self.hw, &mut self.sink);
    }

    fn toggle(&mut self) {
        self.edge(SignalSource::BeltControl);
        self.poll();
    }

    /// `arrivals` cans, then the window closes.
    fn window(&mut self, arrivals: u32) {
        for _ in 0..arrivals {
            self.edge(SignalSource::CanSensor);
        }
        self.latch.on_window_tick();
        self.poll();
    }

    fn command(&mut self, cmd: AppCommand) -> Result<(), ConfigError> {
        self.app
            .handle_command(cmd, &self.latch, &mut self.hw, &mut self.sink)
    }

    /// Press the belt control `after_ms` past the last edge, while the next
    /// tone sequence is playing.
    fn press_during_next_tones(&mut self, after_ms: u32) {
        self.hw.edge_during_tones = Some((
            Arc::clone(&self.latch),
            SignalSource::BeltControl,
            self.now_ms + after_ms,
        ));
    }

    fn trips(&self) -> usize {
        self.sink.count(|e| matches!(e, AppEvent::Tripped(_)))
    }
}

// ── Startup ───────────────────────────────────────────────────

#[test]
fn starts_disarmed_with_outputs_off() {
    let s = Station::new();
    assert_eq!(s.app.state(), StateId::Disarmed);
    assert!(!s.app.is_armed());
    assert_eq!(s.hw.calls, vec![OutputCall::AllOff]);
    assert!(matches!(
        s.sink.events.first(),
        Some(AppEvent::Started(StateId::Disarmed))
    ));
    assert_eq!(s.hw.shown.last().map(|st| st.state), Some(StateId::Disarmed));
}

#[test]
fn windows_while_disarmed_never_trip() {
    let mut s = Station::new();
    for _ in 0..4 {
        s.window(0);
    }
    assert_eq!(s.app.state(), StateId::Disarmed);
    assert_eq!(s.trips(), 0);
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 0);
    assert_eq!(s.app.build_status().windows_closed, 4);
    assert_eq!(s.app.build_status().regime, Regime::High);
}

// ── Arming ────────────────────────────────────────────────────

#[test]
fn arm_starts_belt_then_plays_startup_once() {
    let mut s = Station::new();
    s.toggle();

    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert!(s.latch.is_armed());
    assert_eq!(s.hw.belt_duty(), 560);
    assert!((s.app.current_target_speed() - 5.6).abs() < 1e-6);
    assert_eq!(s.hw.count_tones(&STARTUP_MELODY), 1);
    assert_eq!(s.hw.count_pattern(MatrixPattern::Startup), 1);

    let belt = s.hw.position(&OutputCall::BeltDuty(560));
    let melody = s.hw.position(&OutputCall::Tones(STARTUP_MELODY.to_vec()));
    assert!(belt < melody, "belt must start before the melody");

    // No further startup signal on later passes.
    s.poll();
    s.window(3);
    assert_eq!(s.hw.count_tones(&STARTUP_MELODY), 1);
}

#[test]
fn arm_command_matches_toggle_edge() {
    let mut s = Station::new();
    assert_eq!(s.command(AppCommand::Arm), Ok(()));
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert!(s.latch.is_armed());

    // A second arm is ignored.
    assert_eq!(s.command(AppCommand::Arm), Ok(()));
    assert_eq!(s.hw.count_tones(&STARTUP_MELODY), 1);
}

#[test]
fn bouncing_toggle_only_arms() {
    let mut s = Station::new();
    s.now_ms += 250;
    assert!(s.latch.on_edge(SignalSource::BeltControl, s.now_ms));
    assert!(!s.latch.on_edge(SignalSource::BeltControl, s.now_ms + 40));
    assert!(!s.latch.on_edge(SignalSource::BeltControl, s.now_ms + 120));
    s.poll();
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.trips(), 0);
}

// ── Rate regimes ──────────────────────────────────────────────

#[test]
fn three_arrivals_per_window_is_normal() {
    let mut s = Station::new();
    s.toggle();
    s.hw.clear();
    s.window(3);

    let status = s.app.build_status();
    assert!((status.rate_per_sec - 0.5).abs() < 1e-6);
    assert_eq!(status.regime, Regime::Normal);
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert!(s.hw.belt_writes().is_empty(), "no retarget at normal rate");
    assert!(matches!(
        s.sink.events.iter().rev().find(|e| matches!(e, AppEvent::WindowClosed { .. })),
        Some(AppEvent::WindowClosed { regime: Regime::Normal, .. })
    ));
}

#[test]
fn sparse_window_ramps_to_high_speed() {
    let mut s = Station::new();
    s.toggle();
    s.hw.clear();
    s.window(1);

    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);
    assert_eq!(s.app.recorded_regime(), Some(Regime::High));
    let writes = s.hw.belt_writes();
    assert_eq!(writes.len(), 14);
    assert_eq!(writes.first(), Some(&564));
    assert_eq!(writes.last(), Some(&616));
    assert!(writes.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(s.hw.delayed_ns, 14 * 10 * 1_000_000);
    assert_eq!(s.trips(), 0);
}

#[test]
fn dense_window_slows_belt() {
    let mut s = Station::new();
    s.toggle();
    s.window(5);
    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);
    assert_eq!(s.hw.belt_duty(), 504);
}

#[test]
fn abnormal_then_normal_recovers_without_trip() {
    let mut s = Station::new();
    s.toggle();
    s.window(1);
    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);

    s.window(3);
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.hw.belt_duty(), 560);
    assert_eq!(s.app.recorded_regime(), None);
    assert_eq!(s.trips(), 0);
}

#[test]
fn alternating_abnormal_regimes_do_not_trip() {
    let mut s = Station::new();
    s.toggle();
    s.window(1); // High
    s.window(5); // Low
    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);
    assert_eq!(s.app.recorded_regime(), Some(Regime::Low));
    assert_eq!(s.hw.belt_duty(), 504);
    assert_eq!(s.trips(), 0);
}

// ── Critical stop ─────────────────────────────────────────────

#[test]
fn persistent_regime_trips_once() {
    let mut s = Station::new();
    s.toggle();
    s.window(1);
    s.window(0);

    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(
        s.app.trip_reason(),
        Some(TripReason::PersistentRegime(Regime::High))
    );
    assert_eq!(s.hw.belt_duty(), 0);
    assert!(!s.latch.is_armed());
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 1);
    assert_eq!(s.hw.count_pattern(MatrixPattern::TripSignal), 1);

    let stop = s.hw.calls.iter().rposition(|c| *c == OutputCall::BeltDuty(0));
    let alarm = s.hw.position(&OutputCall::Tones(TRIP_ALARM.to_vec()));
    assert!(stop < alarm, "belt must stop before the alarm sounds");

    // Further windows leave the latch alone.
    s.window(0);
    s.window(9);
    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.trips(), 1);
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 1);
}

#[test]
fn manual_stop_trips_immediately() {
    let mut s = Station::new();
    s.toggle();
    s.toggle();

    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.app.trip_reason(), Some(TripReason::ManualStop));
    assert_eq!(s.hw.belt_duty(), 0);
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 1);
}

#[test]
fn stop_command_while_disarmed_is_ignored() {
    let mut s = Station::new();
    assert_eq!(s.command(AppCommand::Stop), Ok(()));
    assert_eq!(s.app.state(), StateId::Disarmed);
    assert_eq!(s.app.trip_reason(), None);
    assert_eq!(s.trips(), 0);
}

#[test]
fn rearm_clears_counters_and_history() {
    let mut s = Station::new();
    s.toggle();
    s.window(1);
    s.window(1);
    assert_eq!(s.app.state(), StateId::CriticalStop);

    // Cans keep arriving while stopped.
    s.edge(SignalSource::CanSensor);
    s.edge(SignalSource::CanSensor);
    s.toggle();

    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.app.trip_reason(), None);
    assert_eq!(s.app.recorded_regime(), None);
    assert_eq!(s.app.pending_arrivals(), 0);
    assert_eq!(s.hw.belt_duty(), 560);
    assert_eq!(s.hw.count_tones(&STARTUP_MELODY), 2);
    assert_eq!(s.sink.count(|e| *e == AppEvent::Rearmed), 2);

    // A single abnormal window after re-arm is tolerated again.
    s.window(1);
    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);
}

// ── Window phase and blocking outputs ────────────────────────

#[test]
fn window_tick_in_arming_pass_is_discarded() {
    let mut s = Station::new();
    s.edge(SignalSource::BeltControl);
    s.latch.on_window_tick();
    s.poll();

    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.hw.belt_duty(), 560);
    assert_eq!(s.app.recorded_regime(), None);
    assert_eq!(s.app.build_status().windows_closed, 0);

    // The first full window after arming is evaluated normally.
    s.window(3);
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.app.build_status().regime, Regime::Normal);
}

#[test]
fn persistence_needs_two_full_windows_after_arm() {
    let mut s = Station::new();
    s.edge(SignalSource::BeltControl);
    s.latch.on_window_tick();
    s.poll();

    s.window(1);
    assert_eq!(s.app.state(), StateId::ArmedTrippedOnce);
    assert_eq!(s.trips(), 0);

    s.window(1);
    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.trips(), 1);
}

#[test]
fn tick_pending_before_arm_command_is_discarded() {
    let mut s = Station::new();
    s.latch.on_window_tick();
    assert_eq!(s.command(AppCommand::Arm), Ok(()));
    s.poll();
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.app.build_status().windows_closed, 0);
}

#[test]
fn rearm_press_during_trip_alarm_is_handled_next_pass() {
    let mut s = Station::new();
    s.toggle();
    s.press_during_next_tones(500);
    s.toggle();

    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 1);

    s.poll();
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.hw.belt_duty(), 560);
    assert_eq!(s.app.trip_reason(), None);
}

#[test]
fn stop_press_during_startup_melody_is_handled_next_pass() {
    let mut s = Station::new();
    s.press_during_next_tones(500);
    s.toggle();

    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(s.hw.count_tones(&STARTUP_MELODY), 1);

    s.poll();
    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.app.trip_reason(), Some(TripReason::ManualStop));
    assert_eq!(s.hw.belt_duty(), 0);
}

// ── Humidity ──────────────────────────────────────────────────

#[test]
fn critical_humidity_trips_on_next_pass() {
    let mut s = Station::new();
    s.toggle();
    s.hw.set_humidity_pct(85.0);
    s.poll();

    assert_eq!(s.app.state(), StateId::CriticalStop);
    assert_eq!(s.app.trip_reason(), Some(TripReason::Humidity));
    assert_eq!(s.hw.belt_duty(), 0);
    assert_eq!(s.hw.count_tones(&TRIP_ALARM), 1);
    assert_eq!(s.app.build_status().humidity_alert, HumidityAlert::Critical);
}

#[test]
fn elevated_humidity_warns_without_trip() {
    let mut s = Station::new();
    s.toggle();
    s.hw.set_humidity_pct(65.0);
    s.poll();
    s.poll();

    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert_eq!(
        s.sink.count(|e| matches!(
            e,
            AppEvent::HumidityAlert {
                alert: HumidityAlert::Elevated,
                ..
            }
        )),
        1
    );
}

#[test]
fn humidity_is_ignored_while_disarmed() {
    let mut s = Station::new();
    s.hw.set_humidity_pct(95.0);
    s.poll();
    s.poll();
    assert_eq!(s.app.state(), StateId::Disarmed);
    assert_eq!(s.trips(), 0);
}

#[test]
fn failed_humidity_read_keeps_last_value() {
    let mut s = Station::new();
    s.toggle();
    let before = s.app.build_status().humidity_pct;
    assert!((before - 40.0).abs() < 0.1);

    s.hw.humidity_raw = None;
    s.poll();
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    assert!((s.app.build_status().humidity_pct - before).abs() < f32::EPSILON);
}

// ── Indicators ────────────────────────────────────────────────

#[test]
fn arrivals_play_scan_once_per_pass() {
    let mut s = Station::new();
    s.toggle();
    s.edge(SignalSource::CanSensor);
    s.edge(SignalSource::CanSensor);
    s.poll();
    assert_eq!(s.hw.count_pattern(MatrixPattern::Scan), 1);
    assert_eq!(s.app.pending_arrivals(), 2);
}

#[test]
fn display_follows_state_changes() {
    let mut s = Station::new();
    s.toggle();
    assert_eq!(
        s.hw.shown.last().map(|st| (st.state, st.armed)),
        Some((StateId::ArmedNormal, true))
    );

    let shown = s.hw.shown.len();
    s.poll();
    assert_eq!(s.hw.shown.len(), shown, "unchanged status is not redrawn");

    s.toggle();
    let last = s.hw.shown.last().copied();
    assert_eq!(last.map(|st| st.state), Some(StateId::CriticalStop));
    assert_eq!(last.and_then(|st| st.trip_reason), Some(TripReason::ManualStop));
}

#[test]
fn belt_write_failure_does_not_wedge_fsm() {
    let mut s = Station::new();
    s.hw.fail_belt_writes = true;
    s.toggle();
    assert_eq!(s.app.state(), StateId::ArmedNormal);
    s.toggle();
    assert_eq!(s.app.state(), StateId::CriticalStop);
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn invalid_config_is_rejected() {
    let mut s = Station::new();
    let bad = StationConfig {
        humidity_critical_pct: 40.0,
        ..StationConfig::default()
    };
    assert!(matches!(
        s.command(AppCommand::UpdateConfig(bad)),
        Err(ConfigError::ValidationFailed(_))
    ));
    assert_eq!(*s.app.config(), StationConfig::default());
}

#[test]
fn updated_thresholds_apply_on_next_pass() {
    let mut s = Station::new();
    let cfg = StationConfig {
        humidity_elevated_pct: 30.0,
        humidity_critical_pct: 50.0,
        ..StationConfig::default()
    };
    assert_eq!(s.command(AppCommand::UpdateConfig(cfg)), Ok(()));
    s.toggle();
    s.hw.set_humidity_pct(55.0);
    s.poll();
    assert_eq!(s.app.trip_reason(), Some(TripReason::Humidity));
}

#[test]
fn window_length_is_fixed_at_runtime() {
    let mut s = Station::new();
    let cfg = StationConfig {
        window_ms: 3000,
        ..StationConfig::default()
    };
    assert_eq!(s.command(AppCommand::UpdateConfig(cfg)), Ok(()));
    assert_eq!(s.app.config().window_ms, 6000);
}
