//! ESP32 time adapter.
//!
//! - **`target_os = "espidf"`**: [`SystemDelay`] wraps `esp_idf_hal`'s
//!   delay, which yields to FreeRTOS for anything longer than a tick so the
//!   chip can light-sleep during pre-warning and mode feedback waits.
//!   Uptime comes from `esp_timer_get_time()`.
//! - **`not(target_os = "espidf")`**: `std::thread::sleep` and
//!   `std::time::Instant` for host-side simulation.

use embedded_hal::delay::DelayNs;

use crate::drivers::hw_init;

/// Blocking delay provider for the hardware adapter.
pub struct SystemDelay {
    #[cfg(target_os = "espidf")]
    inner: esp_idf_hal::delay::Delay,
}

impl Default for SystemDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemDelay {
    pub fn new() -> Self {
        Self {
            #[cfg(target_os = "espidf")]
            inner: esp_idf_hal::delay::Delay::new_default(),
        }
    }
}

#[cfg(target_os = "espidf")]
impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        DelayNs::delay_ns(&mut self.inner, ns);
    }

    fn delay_us(&mut self, us: u32) {
        DelayNs::delay_us(&mut self.inner, us);
    }

    fn delay_ms(&mut self, ms: u32) {
        DelayNs::delay_ms(&mut self.inner, ms);
    }
}

#[cfg(not(target_os = "espidf"))]
impl DelayNs for SystemDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}

/// Milliseconds since boot (monotonic, wraps at `u32::MAX`).
pub fn uptime_ms() -> u32 {
    (hw_init::now_us() / 1_000) as u32
}
