//! Periodic tick source using ESP-IDF's esp_timer API.
//!
//! One periodic timer raises [`Event::Tick`] on the shared
//! [`EventFlags`] and wakes the parked main loop. The callback runs in the
//! ESP timer task (not ISR), and only takes the flag's critical section.
//!
//! On simulation targets nothing is started; host tests raise ticks
//! themselves.

use crate::drivers::hw_init::HwInitError;
use crate::events::EventFlags;

#[cfg(target_os = "espidf")]
use crate::events::Event;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
static mut TICK_TIMER: esp_timer_handle_t = core::ptr::null_mut();

/// SAFETY: TICK_TIMER is written once in `start_tick_timer()` before any
/// callback fires. Only called from the single main task.
#[cfg(target_os = "espidf")]
unsafe fn tick_timer() -> esp_timer_handle_t { unsafe { TICK_TIMER } }

#[cfg(target_os = "espidf")]
unsafe extern "C" fn tick_cb(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static EventFlags` passed to start_tick_timer.
    let flags = unsafe { &*(arg as *const EventFlags) };
    flags.raise(Event::Tick);
    crate::power::wake_main();
}

/// Start the periodic tick timer.
#[cfg(target_os = "espidf")]
pub fn start_tick_timer(period_ms: u32, flags: &'static EventFlags) -> Result<(), HwInitError> {
    // SAFETY: TICK_TIMER is written here once at boot from the main task
    // before the callback can fire. The callback only raises a flag.
    unsafe {
        let args = esp_timer_create_args_t {
            callback: Some(tick_cb),
            arg: core::ptr::from_ref(flags).cast_mut().cast(),
            dispatch_method: esp_timer_dispatch_t_ESP_TIMER_TASK,
            name: c"tick".as_ptr(),
            skip_unhandled_events: true,
        };
        let ret = esp_timer_create(&args, &raw mut TICK_TIMER);
        if ret != ESP_OK as esp_err_t {
            return Err(HwInitError::TimerCreateFailed(ret));
        }
        let ret = esp_timer_start_periodic(tick_timer(), u64::from(period_ms) * 1_000);
        if ret != ESP_OK as esp_err_t {
            return Err(HwInitError::TimerCreateFailed(ret));
        }
    }
    info!("hw_timer: tick every {} ms", period_ms);
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn start_tick_timer(period_ms: u32, _flags: &'static EventFlags) -> Result<(), HwInitError> {
    log::info!("hw_timer(sim): {} ms tick not started (ticks raised by caller)", period_ms);
    Ok(())
}
