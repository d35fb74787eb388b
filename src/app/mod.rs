//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the conveyor station:
//! draining the edge latch, rate estimation, regime supervision, FSM
//! orchestration, and humidity monitoring.  All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
