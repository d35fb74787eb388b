//! Function-pointer finite state machine engine.
//!
//! Classic embedded FSM pattern ported to Rust:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  StateTable                                                      │
//! │  ┌──────────────────┬───────────┬──────────┬───────────────────┐ │
//! │  │ StateId          │ on_enter  │ on_exit  │ on_update         │ │
//! │  ├──────────────────┼───────────┼──────────┼───────────────────┤ │
//! │  │ Disarmed         │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ ArmedNormal      │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ ArmedTrippedOnce │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  │ CriticalStop     │ fn(ctx)   │ fn(ctx)  │ fn(ctx)->Option<> │ │
//! │  └──────────────────┴───────────┴──────────┴───────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The application service places exactly one [`context::StationInput`]
//! into the context and ticks the engine once.  The engine calls
//! `on_update` for the **current** state.  If it returns `Some(next_id)`,
//! the engine runs `on_exit` for the current state, then `on_enter` for the
//! next, and updates the current pointer.  All functions receive
//! `&mut StationContext` which holds the input, the belt controller,
//! config, and the output requests for the service to act on.

pub mod context;
pub mod states;

use core::fmt;

use context::StationContext;
use log::info;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Enumeration of all station states.
/// Must stay in sync with the state table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Disarmed = 0,
    ArmedNormal = 1,
    ArmedTrippedOnce = 2,
    CriticalStop = 3,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert a `usize` index back to `StateId`.  Panics on out-of-range in
    /// debug builds; returns `CriticalStop` in release (safe fallback).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Disarmed,
            1 => Self::ArmedNormal,
            2 => Self::ArmedTrippedOnce,
            3 => Self::CriticalStop,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::CriticalStop
            }
        }
    }

    pub fn is_armed(self) -> bool {
        matches!(self, Self::ArmedNormal | Self::ArmedTrippedOnce)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Disarmed => "Disarmed",
            Self::ArmedNormal => "Armed-Normal",
            Self::ArmedTrippedOnce => "Armed-TrippedOnce",
            Self::CriticalStop => "CriticalStop",
        }
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Function-pointer type aliases
// ---------------------------------------------------------------------------

/// Signature for `on_enter` and `on_exit` actions.
/// These run exactly once on each state transition.
pub type StateActionFn = fn(&mut StationContext);

/// Signature for the per-input update handler.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type StateUpdateFn = fn(&mut StationContext) -> Option<StateId>;

// ---------------------------------------------------------------------------
// State descriptor (one row in the table)
// ---------------------------------------------------------------------------

/// Static descriptor for a single FSM state.
/// Stored in a fixed-size array — no heap, no `dyn`.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    pub on_enter: Option<StateActionFn>,
    pub on_exit: Option<StateActionFn>,
    pub on_update: StateUpdateFn,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// The finite state machine engine.
///
/// Owns the state table (array of [`StateDescriptor`]); the mutable
/// [`StationContext`] is threaded through every handler call.
pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    /// Index of the currently active state.
    current: usize,
    /// Monotonically increasing tick counter.
    tick_count: u64,
    /// Tick at which the current state was entered.
    state_entry_tick: u64,
}

impl Fsm {
    /// Construct a new FSM with the given state table, starting in `initial`.
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            tick_count: 0,
            state_entry_tick: 0,
        }
    }

    /// Run the initial `on_enter` for the starting state.
    /// Call once after construction, before the first `tick()`.
    pub fn start(&mut self, ctx: &mut StationContext) {
        info!("FSM starting in state: {}", self.table[self.current].name);
        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }

    /// Advance the FSM by one input.
    ///
    /// 1. Call `on_update` for the current state.
    /// 2. If it returns `Some(next)`, execute the transition:
    ///    `on_exit(current)` → update pointer → `on_enter(next)`.
    /// 3. Drop any input the handler left unconsumed.
    pub fn tick(&mut self, ctx: &mut StationContext) {
        self.tick_count += 1;

        let next = (self.table[self.current].on_update)(ctx);
        ctx.input = None;

        if let Some(next_id) = next {
            self.transition(next_id, ctx);
        }
    }

    /// The current state's identity.
    pub fn current_state(&self) -> StateId {
        self.table[self.current].id
    }

    /// How many inputs the FSM has handled in the current state.
    pub fn ticks_in_current_state(&self) -> u64 {
        self.tick_count - self.state_entry_tick
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn transition(&mut self, next_id: StateId, ctx: &mut StationContext) {
        let next_idx = next_id as usize;

        info!(
            "FSM transition: {} -> {}",
            self.table[self.current].name, self.table[next_idx].name
        );

        if let Some(exit) = self.table[self.current].on_exit {
            exit(ctx);
        }

        self.current = next_idx;
        self.state_entry_tick = self.tick_count;

        if let Some(enter) = self.table[self.current].on_enter {
            enter(ctx);
        }
    }
}
