//! Sensor drivers.
//!
//! The station has a single analog sensor, the humidity sensor.  Arrival
//! and belt-control inputs are edge sources handled by
//! [`EdgeLatch`](crate::events::EdgeLatch).

pub mod humidity;
