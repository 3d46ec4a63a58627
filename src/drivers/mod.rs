//! Actuator drivers, hardware initialisation, and peripheral helpers.

pub mod button;
pub mod hw_init;
pub mod hw_timer;
pub mod indicator;
pub mod sprayer;
