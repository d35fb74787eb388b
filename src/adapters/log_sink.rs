//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the `log` facade (env_logger on the host).  Trips go out at `warn!`,
//! everything else at `info!`.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] as one line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Status(s) => {
                info!(
                    "STATUS | state={} | rate={:.2}/s regime={} | speed={:.2} duty={} | \
                     RH={:.0}% ({}) | windows={}",
                    s.state,
                    s.rate_per_sec,
                    s.regime,
                    s.target_speed,
                    s.belt_duty,
                    s.humidity_pct,
                    s.humidity_alert,
                    s.windows_closed,
                );
            }
            AppEvent::StateChanged { from, to } => {
                info!("STATE | {} -> {}", from, to);
            }
            AppEvent::WindowClosed { sample, regime } => {
                info!(
                    "WINDOW | arrivals={} in {}ms | rate={:.2}/s | regime={}",
                    sample.arrivals, sample.window_ms, sample.per_sec, regime
                );
            }
            AppEvent::Tripped(reason) => {
                warn!("TRIP | {}", reason);
            }
            AppEvent::Rearmed => {
                info!("ARM | belt armed, counters reset");
            }
            AppEvent::HumidityAlert { percent, alert } => {
                info!("HUMIDITY | {:.1}% -> {}", percent, alert);
            }
            AppEvent::Started(state) => {
                info!("START | initial_state={}", state);
            }
        }
    }
}
