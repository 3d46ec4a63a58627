//! Indicator LED used as a light sensor.
//!
//! The LED is reverse-biased for a short time so its junction capacitance
//! charges, then the cathode is left floating. Photocurrent discharges it:
//! the brighter the room, the sooner the pin reads low. The discharge time
//! in microseconds, capped at the configured ceiling, is the darkness score.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: drives the two LED legs via hw_init helpers.
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::app::ports::LightSensorPort;
use crate::config::DispenserConfig;
use crate::sensors::DarknessScore;

#[cfg(not(target_os = "espidf"))]
static SIM_DARKNESS: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_darkness(raw: u16) {
    SIM_DARKNESS.store(raw, Ordering::Relaxed);
}

pub struct LightSensor {
    ceiling: u16,
    charge_us: u32,
    total_reads: u32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    anode_gpio: i32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    cathode_gpio: i32,
}

impl LightSensor {
    pub fn new(anode_gpio: i32, cathode_gpio: i32, config: &DispenserConfig) -> Self {
        Self {
            ceiling: config.darkness_ceiling,
            charge_us: config.sensor_charge_us,
            total_reads: 0,
            anode_gpio,
            cathode_gpio,
        }
    }

    pub fn read(&mut self) -> DarknessScore {
        self.total_reads = self.total_reads.saturating_add(1);
        DarknessScore(self.measure().min(self.ceiling))
    }

    pub fn total_reads(&self) -> u32 {
        self.total_reads
    }

    #[cfg(target_os = "espidf")]
    fn measure(&self) -> u16 {
        use crate::drivers::hw_init;

        hw_init::gpio_write(self.anode_gpio, false);
        hw_init::gpio_write(self.cathode_gpio, true);
        hw_init::delay_us(self.charge_us);

        hw_init::gpio_float(self.cathode_gpio);
        let ceiling = u64::from(self.ceiling);
        let start = hw_init::now_us();
        let mut elapsed = 0;
        while elapsed < ceiling && hw_init::gpio_read(self.cathode_gpio) {
            elapsed = hw_init::now_us().saturating_sub(start);
        }
        hw_init::gpio_drive(self.cathode_gpio, false);

        elapsed.min(ceiling) as u16
    }

    #[cfg(not(target_os = "espidf"))]
    fn measure(&self) -> u16 {
        let _ = self.charge_us;
        SIM_DARKNESS.load(Ordering::Relaxed)
    }
}

impl LightSensorPort for LightSensor {
    fn sample(&mut self) -> DarknessScore {
        self.read()
    }
}
