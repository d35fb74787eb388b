//! Interrupt-side edge latch.
//!
//! Edges are produced by:
//! - GPIO edge callbacks (A = can sensor, B = belt control)
//! - The sampling-window timer
//!
//! and consumed by the control loop, which drains everything pending in one
//! [`EdgeLatch::take`] per pass.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ GPIO A edge  │────▶│              │     │              │
//! │ GPIO B edge  │────▶│  EdgeLatch   │────▶│ Control loop │
//! │ Window timer │────▶│  (atomics)   │     │  (consumer)  │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! One debounce window is shared by both inputs: an edge on either line is
//! accepted only if the last accepted edge on *any* line is at least
//! `debounce_ms` old.
//!
//! Producer side is bounded work: a debounce compare and one atomic store
//! or increment.  No locks, no allocation, no logging.  Arrivals are counted
//! (saturating) so a slow consumer never loses cans; belt-control requests
//! coalesce to the most recent one; a window close is a single slot stamped
//! with the window phase it belongs to.

use core::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

/// `window_tick` value meaning no tick is pending.
const NO_TICK: u32 = 0;

/// Which physical input an edge came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSource {
    /// Input A: a can passed the sensor.
    CanSensor,
    /// Input B: operator pressed the belt control.
    BeltControl,
}

/// Meaning of a belt-control press, decided at edge time from the armed
/// flag the control loop publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleRequest {
    Arm,
    Stop,
}

/// Everything drained from the latch in one control-loop pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingInputs {
    /// Accepted can edges since the last drain.
    pub arrivals: u32,
    /// Latest belt-control request, if any.
    pub toggle: Option<ToggleRequest>,
    /// The sampling window elapsed at least once.
    pub window_closed: bool,
    /// Gap between the two most recent accepted can edges (ms).
    pub last_interval_ms: Option<u32>,
}

const TOGGLE_NONE: u8 = 0;
const TOGGLE_ARM: u8 = 1;
const TOGGLE_STOP: u8 = 2;

/// Debounce slot: last accepted timestamp plus a seen flag so the very
/// first edge is always accepted.
struct DebounceSlot {
    last_ms: AtomicU32,
    seen: AtomicBool,
}

impl DebounceSlot {
    const fn new() -> Self {
        Self {
            last_ms: AtomicU32::new(0),
            seen: AtomicBool::new(false),
        }
    }

    /// Accept `now_ms` if it is at least `debounce_ms` after the last
    /// accepted edge.  Returns the previous accepted timestamp on success.
    fn try_accept(&self, now_ms: u32, debounce_ms: u32) -> Option<Option<u32>> {
        if !self.seen.swap(true, Ordering::AcqRel) {
            self.last_ms.store(now_ms, Ordering::Release);
            return Some(None);
        }
        let last = self.last_ms.load(Ordering::Acquire);
        if now_ms.wrapping_sub(last) < debounce_ms {
            return None;
        }
        self.last_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(Some)
    }

    fn reset(&self) {
        self.seen.store(false, Ordering::Release);
        self.last_ms.store(0, Ordering::Release);
    }
}

pub struct EdgeLatch {
    debounce_ms: AtomicU32,
    edge: DebounceSlot,
    // Last accepted can edge, for the inter-arrival interval.
    last_can: DebounceSlot,
    arrivals: AtomicU32,
    last_interval_ms: AtomicU32,
    toggle: AtomicU8,
    armed: AtomicBool,
    // Window phase.  A tick counts only if stamped with the current
    // generation; `restart_window` bumps it.
    window_generation: AtomicU32,
    window_tick: AtomicU32,
}

impl EdgeLatch {
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            debounce_ms: AtomicU32::new(debounce_ms),
            edge: DebounceSlot::new(),
            last_can: DebounceSlot::new(),
            arrivals: AtomicU32::new(0),
            last_interval_ms: AtomicU32::new(0),
            toggle: AtomicU8::new(TOGGLE_NONE),
            armed: AtomicBool::new(false),
            window_generation: AtomicU32::new(0),
            window_tick: AtomicU32::new(NO_TICK),
        }
    }

    /// Edge callback.  Safe to call from interrupt or timer context.
    ///
    /// Returns `true` when the edge was accepted (not a bounce).
    pub fn on_edge(&self, source: SignalSource, now_ms: u32) -> bool {
        let debounce = self.debounce_ms.load(Ordering::Relaxed);
        if self.edge.try_accept(now_ms, debounce).is_none() {
            return false;
        }
        match source {
            SignalSource::CanSensor => {
                let _ = self
                    .arrivals
                    .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                        Some(n.saturating_add(1))
                    });
                if let Some(Some(prev)) = self.last_can.try_accept(now_ms, 0) {
                    self.last_interval_ms
                        .store(now_ms.wrapping_sub(prev), Ordering::Release);
                }
                true
            }
            SignalSource::BeltControl => {
                let request = if self.armed.load(Ordering::Acquire) {
                    TOGGLE_STOP
                } else {
                    TOGGLE_ARM
                };
                self.toggle.store(request, Ordering::Release);
                true
            }
        }
    }

    /// Sampling-window timer callback for the current window phase.
    pub fn on_window_tick(&self) {
        self.on_window_tick_for(self.window_generation());
    }

    /// Timer callback for a window started under `generation`.  A tick from
    /// a phase that has since been restarted is dropped by [`take`](Self::take).
    pub fn on_window_tick_for(&self, generation: u32) {
        self.window_tick.store(stamp(generation), Ordering::Release);
    }

    /// Current window phase.  The timer samples it at the start of each
    /// period and restarts its wait when it changes.
    pub fn window_generation(&self) -> u32 {
        self.window_generation.load(Ordering::Acquire)
    }

    /// Open a fresh sampling window: any pending or in-flight tick from the
    /// previous phase is discarded.
    pub fn restart_window(&self) {
        self.window_generation.fetch_add(1, Ordering::AcqRel);
        self.window_tick.store(NO_TICK, Ordering::Release);
    }

    /// Drain everything pending.  Called once per control-loop pass.
    pub fn take(&self) -> PendingInputs {
        let arrivals = self.arrivals.swap(0, Ordering::AcqRel);
        let toggle = match self.toggle.swap(TOGGLE_NONE, Ordering::AcqRel) {
            TOGGLE_ARM => Some(ToggleRequest::Arm),
            TOGGLE_STOP => Some(ToggleRequest::Stop),
            _ => None,
        };
        let tick = self.window_tick.swap(NO_TICK, Ordering::AcqRel);
        let window_closed = tick != NO_TICK && tick == stamp(self.window_generation());
        let interval = self.last_interval_ms.swap(0, Ordering::AcqRel);
        PendingInputs {
            arrivals,
            toggle,
            window_closed,
            last_interval_ms: (interval > 0).then_some(interval),
        }
    }

    /// Published by the control loop after every arm / trip so edge-time
    /// decisions see the current belt state.
    pub fn set_armed(&self, armed: bool) {
        self.armed.store(armed, Ordering::Release);
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn set_debounce_ms(&self, debounce_ms: u32) {
        self.debounce_ms.store(debounce_ms, Ordering::Relaxed);
    }

    /// Forget debounce history and pending inputs.
    pub fn clear(&self) {
        self.edge.reset();
        self.last_can.reset();
        let _ = self.take();
    }
}

// Generation `g` is stored as `g + 1` so zero stays free for `NO_TICK`.
fn stamp(generation: u32) -> u32 {
    match generation.wrapping_add(1) {
        NO_TICK => 1,
        s => s,
    }
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new(200)
    }
}
