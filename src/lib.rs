//! Conveyor sorting station library.
//!
//! Exposes the control core, drivers and host adapters for the binary and
//! for integration testing.  Hardware access goes through the port traits
//! in [`app::ports`]; the simulated drivers in [`drivers`] and the host
//! adapters in [`adapters`] back them on a workstation.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod events;
pub mod fsm;
pub mod safety;
pub mod sensors;
