//! Four-line character status display.
//!
//! Renders a [`StatusData`] snapshot into four lines of at most
//! [`LINE_WIDTH`] characters.  Text that does not fit is cut at the line
//! width.
//!
//! ```text
//! ┌────────────────────┐
//! │ARMED NORMAL        │
//! │RATE:0.50/s Normal  │
//! │VE:5.60 VL:0.17     │
//! │RH:42% OK           │
//! └────────────────────┘
//! ```
//!
//! `VE` is the belt target speed and `VL` the can speed on the belt.
//!
//! On host/test the display logs each changed frame instead of driving a
//! panel.

use core::fmt::Write;

use heapless::String;
use log::info;

use crate::app::events::StatusData;
use crate::fsm::StateId;

pub const LINE_WIDTH: usize = 20;
pub const LINE_COUNT: usize = 4;

pub type Line = String<LINE_WIDTH>;
pub type Screen = [Line; LINE_COUNT];

fn state_label(state: StateId) -> &'static str {
    match state {
        StateId::Disarmed => "DISARMED",
        StateId::ArmedNormal => "ARMED NORMAL",
        StateId::ArmedTrippedOnce => "ARMED TRIPPED ONCE",
        StateId::CriticalStop => "CRITICAL STOP",
    }
}

/// Write `args` into a fresh line, keeping whatever fits.
fn line(args: core::fmt::Arguments<'_>) -> Line {
    let mut out = Line::new();
    let mut scratch: String<64> = String::new();
    let _ = scratch.write_fmt(args);
    for ch in scratch.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

pub fn render_lines(status: &StatusData) -> Screen {
    let speeds = match status.can_speed_mps {
        Some(v) => line(format_args!("VE:{:.2} VL:{:.2}", status.target_speed, v)),
        None => line(format_args!("VE:{:.2} VL:--", status.target_speed)),
    };
    [
        line(format_args!("{}", state_label(status.state))),
        line(format_args!("RATE:{:.2}/s {}", status.rate_per_sec, status.regime)),
        speeds,
        line(format_args!(
            "RH:{:.0}% {}",
            status.humidity_pct, status.humidity_alert
        )),
    ]
}

/// Logging display used on host targets.
#[derive(Debug, Default)]
pub struct StatusDisplay {
    screen: Option<Screen>,
}

impl StatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, status: &StatusData) {
        let screen = render_lines(status);
        if self.screen.as_ref() == Some(&screen) {
            return;
        }
        info!(
            "DISPLAY | {} | {} | {} | {}",
            screen[0], screen[1], screen[2], screen[3]
        );
        self.screen = Some(screen);
    }

    pub fn screen(&self) -> Option<&Screen> {
        self.screen.as_ref()
    }
}
