//! Operator console for the host simulation.
//!
//! Reads stdin line by line on its own thread and turns each line into a
//! simulated input:
//!
//! | Line        | Effect                                  |
//! |-------------|-----------------------------------------|
//! | `a`         | edge on input A (can sensor)            |
//! | `b`         | edge on input B (belt control)          |
//! | `h <pct>`   | set the simulated humidity to `<pct>` % |
//! | `q`         | quit                                    |
//!
//! Edges go through [`EdgeLatch::on_edge`] exactly like a GPIO callback,
//! so the debounce applies to typed input too.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use log::{info, warn};

use crate::adapters::time::MonotonicClock;
use crate::error::Error;
use crate::events::{EdgeLatch, SignalSource};
use crate::sensors::humidity::SimHumidity;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsoleInput {
    CanEdge,
    ToggleEdge,
    Humidity(f32),
    Quit,
}

pub fn parse_console_line(line: &str) -> Option<ConsoleInput> {
    let mut parts = line.split_whitespace();
    let input = match parts.next()? {
        "a" | "A" => ConsoleInput::CanEdge,
        "b" | "B" => ConsoleInput::ToggleEdge,
        "q" | "Q" | "quit" => ConsoleInput::Quit,
        "h" | "H" => {
            let pct: f32 = parts.next()?.parse().ok()?;
            if !(0.0..=100.0).contains(&pct) {
                return None;
            }
            ConsoleInput::Humidity(pct)
        }
        _ => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(input)
}

/// Everything the console thread needs to inject inputs.
pub struct ConsoleTargets {
    pub latch: Arc<EdgeLatch>,
    pub clock: MonotonicClock,
    pub humidity: SimHumidity,
    pub humidity_adc_max: u16,
    pub quit: Arc<AtomicBool>,
}

/// Spawn the stdin reader thread.  The thread exits on `q` or end of input
/// and sets the quit flag either way.
pub fn spawn_console(targets: ConsoleTargets) -> Result<JoinHandle<()>, Error> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            info!("console: a = can, b = belt control, h <pct> = humidity, q = quit");
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                match parse_console_line(&line) {
                    Some(ConsoleInput::CanEdge) => {
                        let now = targets.clock.uptime_ms();
                        if !targets.latch.on_edge(SignalSource::CanSensor, now) {
                            info!("console: A edge debounced");
                        }
                    }
                    Some(ConsoleInput::ToggleEdge) => {
                        let now = targets.clock.uptime_ms();
                        if !targets.latch.on_edge(SignalSource::BeltControl, now) {
                            info!("console: B edge debounced");
                        }
                    }
                    Some(ConsoleInput::Humidity(pct)) => {
                        targets.humidity.set_percent(pct, targets.humidity_adc_max);
                        info!("console: humidity set to {pct:.1}%");
                    }
                    Some(ConsoleInput::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => warn!("console: unrecognised input {:?}", line.trim()),
                }
            }
            targets.quit.store(true, Ordering::Release);
        })
        .map_err(|_| Error::Init("console thread spawn failed"))
}
