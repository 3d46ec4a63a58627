//! Low-power wait between wake cycles.
//!
//! With ESP-IDF power management and tickless idle, a blocked main task
//! lets the chip drop into automatic light sleep. The main loop parks in
//! [`wait_for_event`] on a FreeRTOS task notification; the tick callback
//! and the button ISR call [`wake_main`] after raising their flag. Task
//! notifications latch, so a flag raised between the pending check and the
//! wait still wakes the loop.
//!
//! On host targets the wait polls the flags every `POLL_MS`.

use crate::drivers::hw_init::HwInitError;
use crate::events::EventFlags;

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicPtr, Ordering};

/// Host poll interval while parked.
#[cfg(not(target_os = "espidf"))]
pub const POLL_MS: u32 = 20;

/// Task handle of the loop parked in [`wait_for_event`]; null until it first
/// parks.
#[cfg(target_os = "espidf")]
static MAIN_TASK: AtomicPtr<core::ffi::c_void> = AtomicPtr::new(core::ptr::null_mut());

/// Enable dynamic frequency scaling with automatic light sleep.
#[cfg(target_os = "espidf")]
pub fn enable_light_sleep() -> Result<(), HwInitError> {
    use esp_idf_svc::sys::{esp_err_t, esp_pm_config_t, esp_pm_configure, ESP_OK};

    let cfg = esp_pm_config_t {
        max_freq_mhz: 80,
        min_freq_mhz: 10,
        light_sleep_enable: true,
    };
    // SAFETY: esp_pm_configure copies the config before returning.
    let ret = unsafe { esp_pm_configure(core::ptr::from_ref(&cfg).cast()) };
    if ret != ESP_OK as esp_err_t {
        return Err(HwInitError::PowerConfigFailed(ret));
    }
    log::info!("power: automatic light sleep enabled");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn enable_light_sleep() -> Result<(), HwInitError> {
    log::info!("power(sim): light sleep not available");
    Ok(())
}

/// Block until at least one event is pending and consumable.
#[cfg(target_os = "espidf")]
pub fn wait_for_event(flags: &EventFlags) {
    use esp_idf_hal::{delay::BLOCK, task};

    if MAIN_TASK.load(Ordering::Acquire).is_null() {
        if let Some(handle) = task::current() {
            MAIN_TASK.store(handle.cast(), Ordering::Release);
        }
    }
    while !flags.has_pending() {
        task::wait_notification(BLOCK);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn wait_for_event(flags: &EventFlags) {
    while !flags.has_pending() {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(POLL_MS)));
    }
}

/// Wake the parked main loop. Safe from ISR and timer-task context; a no-op
/// until the loop has parked once (it checks the flags before blocking).
#[cfg(target_os = "espidf")]
pub fn wake_main() {
    use core::num::NonZeroU32;
    use esp_idf_hal::task;

    let handle = MAIN_TASK.load(Ordering::Acquire);
    if handle.is_null() {
        return;
    }
    // SAFETY: the handle belongs to the main task, which never exits.
    // `notify_and_yield` picks the FromISR variant when in interrupt context.
    let _ = unsafe { task::notify_and_yield(handle.cast(), NonZeroU32::MIN) };
}

#[cfg(not(target_os = "espidf"))]
pub fn wake_main() {}
