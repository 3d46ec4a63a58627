//! Single indicator LED.
//!
//! The same LED doubles as the light sensor (see
//! [`crate::sensors::light`]), so a blink always leaves both legs driven
//! low, ready for the next measurement.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the anode via hw_init.
//! On host/test: counts pulses only.

use crate::app::ports::IndicatorPort;
use crate::drivers::hw_init;

pub struct Indicator {
    anode_gpio: i32,
    cathode_gpio: i32,
    pulse_us: u32,
    pulses: u32,
}

impl Indicator {
    pub fn new(anode_gpio: i32, cathode_gpio: i32, pulse_us: u32) -> Self {
        Self {
            anode_gpio,
            cathode_gpio,
            pulse_us,
            pulses: 0,
        }
    }

    /// One forward-biased pulse of the configured width.
    pub fn pulse(&mut self) {
        hw_init::gpio_write(self.cathode_gpio, false);
        hw_init::gpio_write(self.anode_gpio, true);
        hw_init::delay_us(self.pulse_us);
        hw_init::gpio_write(self.anode_gpio, false);
        self.pulses = self.pulses.wrapping_add(1);
    }

    /// Pulses emitted since boot.
    pub fn pulses(&self) -> u32 {
        self.pulses
    }
}

impl IndicatorPort for Indicator {
    fn blink(&mut self) {
        self.pulse();
    }
}
