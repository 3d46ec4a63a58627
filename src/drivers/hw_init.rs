//! One-shot hardware peripheral initialization and raw GPIO helpers.
//!
//! Configures GPIO directions and the level-triggered button interrupts
//! using raw ESP-IDF sys calls. Called once from `main()` before the event loop starts.
//! The helpers below are also used by the drivers on every tick.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    GpioConfigFailed(i32),
    IsrInstallFailed(i32),
    IsrHandlerFailed(i32),
    TimerCreateFailed(i32),
    PowerConfigFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::GpioConfigFailed(rc)  => write!(f, "GPIO config failed (rc={})", rc),
            Self::IsrInstallFailed(rc)  => write!(f, "GPIO ISR service install failed (rc={})", rc),
            Self::IsrHandlerFailed(rc)  => write!(f, "GPIO ISR handler add failed (rc={})", rc),
            Self::TimerCreateFailed(rc) => write!(f, "tick timer setup failed (rc={})", rc),
            Self::PowerConfigFailed(rc) => write!(f, "power management config failed (rc={})", rc),
        }
    }
}

#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before event loop; single-threaded.
    unsafe {
        init_gpio_inputs()?;
        init_gpio_outputs()?;
    }
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── GPIO Inputs ───────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_inputs() -> Result<(), HwInitError> {
    for &pin in &[pins::BUTTON_SPRAY_GPIO, pins::BUTTON_MODE_GPIO] {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }
        // Buttons must be able to end a light sleep. Wake and ISR share the
        // interrupt type, so it stays a level type from here on.
        let ret = unsafe { gpio_wakeup_enable(pin, gpio_int_type_t_GPIO_INTR_LOW_LEVEL) };
        if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }
    }

    let ret = unsafe { esp_sleep_enable_gpio_wakeup() };
    if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }

    info!("hw_init: button inputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: gpio_get_level is a read-only register access.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    false
}

// ── GPIO Outputs ──────────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe fn init_gpio_outputs() -> Result<(), HwInitError> {
    let output_pins = [
        pins::MOTOR_GPIO,
        pins::LED_ANODE_GPIO,
        pins::LED_CATHODE_GPIO,
    ];

    for &pin in &output_pins {
        let cfg = gpio_config_t {
            pin_bit_mask: 1u64 << pin,
            mode: gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
            pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
            pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
            intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
        };
        let ret = unsafe { gpio_config(&cfg) };
        if ret != ESP_OK as esp_err_t { return Err(HwInitError::GpioConfigFailed(ret)); }
        unsafe { gpio_set_level(pin, 0) };
    }

    // Motor must stay off through light sleep.
    unsafe { gpio_hold_en(pins::MOTOR_GPIO) };

    info!("hw_init: GPIO outputs configured");
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(pin, u32::from(high)); }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

/// Release a pin so it floats (input, no pulls).
#[cfg(target_os = "espidf")]
pub fn gpio_float(pin: i32) {
    // SAFETY: direction/pull changes on a pin this module configured.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(pin, gpio_pull_mode_t_GPIO_FLOATING);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_float(_pin: i32) {}

/// Return a floated pin to push-pull output at `high`.
#[cfg(target_os = "espidf")]
pub fn gpio_drive(pin: i32, high: bool) {
    // SAFETY: see gpio_float.
    unsafe {
        gpio_set_direction(pin, gpio_mode_t_GPIO_MODE_INPUT_OUTPUT);
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_drive(_pin: i32, _high: bool) {}

/// Release the motor pin hold while the motor is driven.
#[cfg(target_os = "espidf")]
pub fn gpio_hold(pin: i32, hold: bool) {
    // SAFETY: hold latch on an output pin; main-loop only.
    unsafe {
        if hold {
            gpio_hold_en(pin);
        } else {
            gpio_hold_dis(pin);
        }
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_hold(_pin: i32, _hold: bool) {}

// ── Timing ────────────────────────────────────────────────────

/// Microseconds since boot (esp_timer, monotonic).
#[cfg(target_os = "espidf")]
pub fn now_us() -> u64 {
    // SAFETY: RTC counter read; safe from any context.
    (unsafe { esp_timer_get_time() }) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn now_us() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_micros() as u64
}

/// Busy-wait for sub-millisecond pulses.
#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: ROM busy-wait; no shared state.
    unsafe { esp_rom_delay_us(us) };
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(_us: u32) {}

// ── GPIO ISR Service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
use crate::drivers::button::{ArmLevel, ButtonIsr};

#[cfg(target_os = "espidf")]
fn intr_type_for(level: ArmLevel) -> gpio_int_type_t {
    match level {
        ArmLevel::Low => gpio_int_type_t_GPIO_INTR_LOW_LEVEL,
        ArmLevel::High => gpio_int_type_t_GPIO_INTR_HIGH_LEVEL,
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn button_gpio_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static ButtonIsr` registered in init_isr_service.
    let button = unsafe { &*(arg as *const ButtonIsr) };
    let pressed = !gpio_read(button.gpio());
    let now_ms = (now_us() / 1_000) as u32;
    let next = button.on_level(pressed, now_ms);
    // SAFETY: gpio_set_intr_type takes the GPIO spinlock and is ISR-safe.
    // Flipping between the two level types keeps the wakeup enable intact.
    unsafe { gpio_set_intr_type(button.gpio(), intr_type_for(next)) };
    if pressed {
        crate::power::wake_main();
    }
}

/// Install the GPIO ISR service and hook both buttons.
/// Call after init_peripherals() and before the event loop.
#[cfg(target_os = "espidf")]
pub fn init_isr_service(
    spray: &'static ButtonIsr,
    mode: &'static ButtonIsr,
) -> Result<(), HwInitError> {
    // SAFETY: gpio_install_isr_service is idempotent; ESP_ERR_INVALID_STATE
    // means it was already installed. The registered contexts are 'static
    // and only touch atomics and the critical-section event flags.
    unsafe {
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK as esp_err_t && ret != ESP_ERR_INVALID_STATE as esp_err_t {
            return Err(HwInitError::IsrInstallFailed(ret));
        }

        for ctx in [spray, mode] {
            let pin = ctx.gpio();
            gpio_set_intr_type(pin, intr_type_for(ArmLevel::Low));
            let ret = gpio_isr_handler_add(
                pin,
                Some(button_gpio_isr),
                core::ptr::from_ref(ctx).cast_mut().cast(),
            );
            if ret != ESP_OK as esp_err_t {
                return Err(HwInitError::IsrHandlerFailed(ret));
            }
            gpio_intr_enable(pin);
        }

        info!("hw_init: ISR service installed (spray, mode buttons)");
    }
    Ok(())
}
