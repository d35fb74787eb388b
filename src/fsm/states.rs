//! Concrete state handler functions and table builder.
//!
//! Each state is defined by three plain `fn` pointers — no closures, no
//! dynamic dispatch, no heap.  This is the classic embedded C FSM pattern
//! expressed in safe Rust.
//!
//! ```text
//!  DISARMED ──[arm]──▶ ARMED-NORMAL ──[first abnormal]──▶ ARMED-TRIPPED-ONCE
//!                          ▲   ▲                              │      │
//!                          │   └────────[recovered]───────────┘      │
//!                          │                            [persistent] │
//!                        [arm]                                       ▼
//!                          └───────────────────────────── CRITICAL-STOP
//!
//!  Any armed state ──[manual stop / critical humidity]──▶ CRITICAL-STOP
//! ```

use super::context::{StationContext, StationInput};
use super::{StateDescriptor, StateId};
use crate::control::regime::Regime;
use crate::error::TripReason;
use crate::safety::WindowVerdict;
use log::{info, warn};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0 — Disarmed
        StateDescriptor {
            id: StateId::Disarmed,
            name: "Disarmed",
            on_enter: Some(disarmed_enter),
            on_exit: None,
            on_update: disarmed_update,
        },
        // Index 1 — Armed-Normal
        StateDescriptor {
            id: StateId::ArmedNormal,
            name: "Armed-Normal",
            on_enter: Some(armed_normal_enter),
            on_exit: None,
            on_update: armed_normal_update,
        },
        // Index 2 — Armed-TrippedOnce
        StateDescriptor {
            id: StateId::ArmedTrippedOnce,
            name: "Armed-TrippedOnce",
            on_enter: Some(tripped_once_enter),
            on_exit: None,
            on_update: tripped_once_update,
        },
        // Index 3 — CriticalStop
        StateDescriptor {
            id: StateId::CriticalStop,
            name: "CriticalStop",
            on_enter: Some(critical_stop_enter),
            on_exit: Some(critical_stop_exit),
            on_update: critical_stop_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  Shared helpers
// ═══════════════════════════════════════════════════════════════════════════

fn retarget(ctx: &mut StationContext, regime: Regime) {
    let speed = regime.target_speed(&ctx.config);
    let duty = ctx.config.duty_for_speed(speed);
    ctx.belt.set_target(speed, duty);
}

fn begin_trip(ctx: &mut StationContext, reason: TripReason) -> Option<StateId> {
    ctx.trip_reason = Some(reason);
    Some(StateId::CriticalStop)
}

// ═══════════════════════════════════════════════════════════════════════════
//  DISARMED state — power-on, belt stopped, waiting for the operator
// ═══════════════════════════════════════════════════════════════════════════

fn disarmed_enter(ctx: &mut StationContext) {
    info!("DISARMED: belt stopped, waiting for arm");
    let _ = ctx.belt.trip();
}

fn disarmed_update(ctx: &mut StationContext) -> Option<StateId> {
    match ctx.input.take() {
        Some(StationInput::Arm) => Some(StateId::ArmedNormal),
        _ => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED-NORMAL state — belt at normal speed, no abnormal regime recorded
// ═══════════════════════════════════════════════════════════════════════════

fn armed_normal_enter(ctx: &mut StationContext) {
    if ctx.belt.is_armed() {
        // Recovered from Armed-TrippedOnce: ramp back to normal.
        retarget(ctx, Regime::Normal);
        info!("ARMED-NORMAL: ramping back to {:.2}", ctx.config.speed_normal);
        return;
    }

    let speed = ctx.config.speed_normal;
    let duty = ctx.config.duty_for_speed(speed);
    ctx.requests.startup = ctx.belt.arm(speed, duty);
    ctx.requests.rearmed = true;
    ctx.trip_reason = None;
    info!("ARMED-NORMAL: belt armed at {speed:.2} (duty {duty})");
}

fn armed_normal_update(ctx: &mut StationContext) -> Option<StateId> {
    match ctx.input.take()? {
        StationInput::Trip(reason) => begin_trip(ctx, reason),
        StationInput::Window(WindowVerdict::FirstAbnormal(regime)) => {
            retarget(ctx, regime);
            Some(StateId::ArmedTrippedOnce)
        }
        StationInput::Window(WindowVerdict::Persistent(regime)) => {
            begin_trip(ctx, TripReason::PersistentRegime(regime))
        }
        StationInput::Arm
        | StationInput::Window(WindowVerdict::Steady | WindowVerdict::Recovered) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  ARMED-TRIPPED-ONCE state — one abnormal window tolerated
// ═══════════════════════════════════════════════════════════════════════════

fn tripped_once_enter(ctx: &mut StationContext) {
    warn!(
        "ARMED-TRIPPED-ONCE: abnormal regime, belt retargeted to {:.2}",
        ctx.belt.current_target_speed()
    );
}

fn tripped_once_update(ctx: &mut StationContext) -> Option<StateId> {
    match ctx.input.take()? {
        StationInput::Trip(reason) => begin_trip(ctx, reason),
        StationInput::Window(WindowVerdict::Persistent(regime)) => {
            begin_trip(ctx, TripReason::PersistentRegime(regime))
        }
        StationInput::Window(WindowVerdict::FirstAbnormal(regime)) => {
            info!("ARMED-TRIPPED-ONCE: regime switched to {regime}");
            retarget(ctx, regime);
            None
        }
        StationInput::Window(WindowVerdict::Recovered) => Some(StateId::ArmedNormal),
        StationInput::Arm | StationInput::Window(WindowVerdict::Steady) => None,
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  CRITICAL-STOP state — belt forced to zero, terminal until re-arm
// ═══════════════════════════════════════════════════════════════════════════

fn critical_stop_enter(ctx: &mut StationContext) {
    let _ = ctx.belt.trip();
    ctx.requests.trip_alarm = true;
    match ctx.trip_reason {
        Some(reason) => warn!("CRITICAL-STOP: belt stopped ({reason})"),
        None => warn!("CRITICAL-STOP: belt stopped"),
    }
}

fn critical_stop_exit(ctx: &mut StationContext) {
    info!("CRITICAL-STOP: operator re-arm");
    ctx.trip_reason = None;
}

fn critical_stop_update(ctx: &mut StationContext) -> Option<StateId> {
    match ctx.input.take() {
        Some(StationInput::Arm) => Some(StateId::ArmedNormal),
        _ => None,
    }
}
