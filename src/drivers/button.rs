//! ISR-debounced push buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with internal pull-ups.
//!
//! ## Level-triggered interrupts
//!
//! Light-sleep GPIO wakeup only works with level interrupt types, and the
//! wake source shares the pin's interrupt-type field with the ISR. So each
//! button uses level interrupts for both wake and ISR:
//!
//! ```text
//!   armed LOW ──[pin low]──▶ press: debounce, raise flag, re-arm HIGH
//!   armed HIGH ─[pin high]─▶ release: re-arm LOW
//! ```
//!
//! A held button never re-fires, and a press that happens during light
//! sleep still wakes the chip and is delivered once it is awake, because
//! the level is still low. [`ButtonIsr::on_level`] returns the level to
//! arm next; the ISR in `hw_init` writes it back to the pin.
//!
//! Everything here is lock-free or critical-section based so it can be
//! called from interrupt context and live in a `static`.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::events::{Event, EventFlags};

/// Edge filter: accepts an edge only if the previous accepted edge is at
/// least `window_ms` old.
pub struct Debouncer {
    window_ms: AtomicU32,
    last_ms: AtomicU32,
    armed: AtomicBool,
}

impl Debouncer {
    pub const fn new(window_ms: u32) -> Self {
        Self {
            window_ms: AtomicU32::new(window_ms),
            last_ms: AtomicU32::new(0),
            armed: AtomicBool::new(false),
        }
    }

    pub fn set_window_ms(&self, window_ms: u32) {
        self.window_ms.store(window_ms, Ordering::Relaxed);
    }

    /// `true` if the edge at `now_ms` counts as a new press.
    pub fn accept(&self, now_ms: u32) -> bool {
        if self.armed.load(Ordering::Acquire) {
            let last = self.last_ms.load(Ordering::Acquire);
            if now_ms.wrapping_sub(last) < self.window_ms.load(Ordering::Relaxed) {
                return false;
            }
        }
        self.last_ms.store(now_ms, Ordering::Release);
        self.armed.store(true, Ordering::Release);
        true
    }
}

/// Interrupt level a button pin should be armed for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmLevel {
    /// Waiting for a press.
    Low,
    /// Pressed; waiting for release.
    High,
}

/// Interrupt context for one button: its pin, which flag to raise, and where.
pub struct ButtonIsr {
    gpio: i32,
    event: Event,
    flags: &'static EventFlags,
    debounce: Debouncer,
    held: AtomicBool,
    accepted: AtomicU32,
}

impl ButtonIsr {
    pub const fn new(gpio: i32, event: Event, flags: &'static EventFlags, debounce_ms: u32) -> Self {
        Self {
            gpio,
            event,
            flags,
            debounce: Debouncer::new(debounce_ms),
            held: AtomicBool::new(false),
            accepted: AtomicU32::new(0),
        }
    }

    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    /// Apply the configured debounce window (call before installing the ISR).
    pub fn configure(&self, debounce_ms: u32) {
        self.debounce.set_window_ms(debounce_ms);
    }

    /// ISR entry point: the armed level was reached. `pressed` is the pin
    /// reading (low = pressed). Returns the level to arm next.
    pub fn on_level(&self, pressed: bool, now_ms: u32) -> ArmLevel {
        if pressed {
            if !self.held.swap(true, Ordering::AcqRel) {
                self.on_edge(now_ms);
            }
            ArmLevel::High
        } else {
            self.held.store(false, Ordering::Release);
            ArmLevel::Low
        }
    }

    /// A new press, subject to the debounce window.
    pub fn on_edge(&self, now_ms: u32) {
        if self.debounce.accept(now_ms) {
            self.accepted.fetch_add(1, Ordering::Relaxed);
            self.flags.raise(self.event);
        }
    }

    /// Presses accepted since boot.
    pub fn accepted(&self) -> u32 {
        self.accepted.load(Ordering::Relaxed)
    }
}
