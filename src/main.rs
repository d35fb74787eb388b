//! Conveyor Station — Main Entry Point
//!
//! Host simulation of the sorting station, wired the same way a board
//! build would be: inputs land in the edge latch, the control loop drains
//! it, and every output goes through the hardware adapter.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   JsonConfigFile  Console │
//! │  (Sensor+Actuator+      (EventSink)    (ConfigPort)    (stdin) │
//! │   Alarm+Display)                                               │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Estimator · Regime · Supervisor · FSM · Belt          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  EdgeLatch (atomics) ◀── console edges, window timer thread    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::Result;
use log::{info, warn};

use conveyor_station::adapters::config_file::JsonConfigFile;
use conveyor_station::adapters::console::{ConsoleTargets, spawn_console};
use conveyor_station::adapters::hardware::HardwareAdapter;
use conveyor_station::adapters::log_sink::LogEventSink;
use conveyor_station::adapters::time::{MonotonicClock, StdDelay};
use conveyor_station::app::ports::{ActuatorPort, ConfigPort};
use conveyor_station::app::service::AppService;
use conveyor_station::config::{BELT_DUTY_MAX, StationConfig};
use conveyor_station::drivers::belt_motor::BeltMotor;
use conveyor_station::drivers::buzzer::Buzzer;
use conveyor_station::drivers::matrix::SimMatrix;
use conveyor_station::drivers::sim_pwm::SimPwm;
use conveyor_station::drivers::status_led::StatusLed;
use conveyor_station::drivers::window_timer::WindowTimer;
use conveyor_station::events::EdgeLatch;
use conveyor_station::sensors::humidity::SimHumidity;

/// Simulated humidity at power-on.
const INITIAL_HUMIDITY_PCT: f32 = 40.0;

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Conveyor Station v{}             ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config (or defaults) ──────────────────────────
    let config = match JsonConfigFile::from_env() {
        Some(file) => match file.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(
                    "Config load from {} failed ({}), using defaults",
                    file.path().display(),
                    e
                );
                StationConfig::default()
            }
        },
        None => {
            info!("No config file set, using defaults");
            StationConfig::default()
        }
    };

    // ── 3. Edge latch + window timer ──────────────────────────
    let latch = Arc::new(EdgeLatch::new(config.debounce_ms));
    let clock = MonotonicClock::new();
    let mut window_timer = WindowTimer::start(Arc::clone(&latch), config.window_ms)?;

    // ── 4. Simulated peripherals ──────────────────────────────
    let humidity = SimHumidity::new(0);
    humidity.set_percent(INITIAL_HUMIDITY_PCT, config.humidity_adc_max);

    let mut hw = HardwareAdapter::new(
        BeltMotor::new(SimPwm::new(BELT_DUTY_MAX)),
        Buzzer::new(SimPwm::new(u16::MAX)),
        StatusLed::new(SimPwm::new(255), SimPwm::new(255), SimPwm::new(255)),
        humidity.clone(),
        SimMatrix::new(),
        StdDelay,
    );
    let mut log_sink = LogEventSink::new();

    // ── 5. Operator console ───────────────────────────────────
    let quit = Arc::new(AtomicBool::new(false));
    let _console = spawn_console(ConsoleTargets {
        latch: Arc::clone(&latch),
        clock,
        humidity,
        humidity_adc_max: config.humidity_adc_max,
        quit: Arc::clone(&quit),
    })?;

    // ── 6. Construct app service ──────────────────────────────
    let loop_interval = Duration::from_millis(u64::from(config.control_loop_interval_ms));
    let mut app = AppService::new(config);
    app.start(&latch, &mut hw, &mut log_sink);
    info!(
        "System ready. Worst-case blocking output: {} ms",
        app.max_blocking_output_ms()
    );

    // ── 7. Control loop ───────────────────────────────────────
    while !quit.load(Ordering::Acquire) {
        std::thread::sleep(loop_interval);
        app.poll(&latch, clock.uptime_ms(), &mut hw, &mut log_sink);
    }

    // ── 8. Shutdown ───────────────────────────────────────────
    window_timer.stop();
    hw.all_off();
    info!("Shutdown after {} control passes", app.pass_count());
    Ok(())
}
