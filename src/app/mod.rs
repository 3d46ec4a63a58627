//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules of the dispenser: the tick
//! engine, mode management, and the actuation sequence. All interaction
//! with hardware happens through **port traits** defined in [`ports`],
//! keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod mode;
pub mod ports;
pub mod service;
