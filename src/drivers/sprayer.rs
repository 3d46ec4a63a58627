//! Spray motor driver (single low-side MOSFET).
//!
//! On/off only. The run time is enforced by the caller; this driver is a
//! dumb actuator. The pin is latched low between runs so it cannot glitch
//! on during light sleep.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the GPIO via hw_init helpers.
//! On host/test: tracks state in-memory only.

use crate::app::ports::SprayPort;
use crate::drivers::hw_init;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorState {
    Stopped,
    Running,
}

pub struct Sprayer {
    gpio: i32,
    state: MotorState,
    runs: u32,
}

impl Sprayer {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            state: MotorState::Stopped,
            runs: 0,
        }
    }

    pub fn start(&mut self) {
        hw_init::gpio_hold(self.gpio, false);
        hw_init::gpio_write(self.gpio, true);
        if self.state == MotorState::Stopped {
            self.runs = self.runs.saturating_add(1);
        }
        self.state = MotorState::Running;
    }

    pub fn stop(&mut self) {
        hw_init::gpio_write(self.gpio, false);
        hw_init::gpio_hold(self.gpio, true);
        self.state = MotorState::Stopped;
    }

    pub fn state(&self) -> MotorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == MotorState::Running
    }

    /// Number of starts since boot.
    pub fn runs(&self) -> u32 {
        self.runs
    }
}

impl SprayPort for Sprayer {
    fn motor_on(&mut self) {
        self.start();
    }

    fn motor_off(&mut self) {
        self.stop();
    }
}
