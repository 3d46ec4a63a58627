//! Interrupt-driven input flags.
//!
//! Events are produced by:
//! - the periodic tick timer callback
//! - the two button GPIO ISRs (spray, mode)
//!
//! and consumed once per wake cycle by the main loop.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────┐     ┌──────────────┐
//! │ Tick timer  │────▶│                  │     │              │
//! │ Spray ISR   │────▶│  EventFlags      │────▶│  Main Loop   │
//! │ Mode ISR    │────▶│  (crit. section) │     │  (consumer)  │
//! └─────────────┘     └──────────────────┘     └──────────────┘
//! ```
//!
//! Each source owns one boolean. Raising an already-raised flag is a no-op,
//! so repeated edges between two wake cycles collapse into one event.
//! [`EventFlags::take`] clears every flag before the caller acts on them,
//! so an edge that arrives while an event is being serviced is kept for the
//! next cycle.
//!
//! While a [`ServiceGuard`] is alive, `take` hands out nothing: producers
//! still record their edges, consumption is deferred until the guard drops.

use core::cell::Cell;
use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

/// Wake sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Event {
    /// Periodic tick timer fired.
    Tick = 0,
    /// Debounced press on the spray button.
    SprayRequested = 1,
    /// Debounced press on the mode button.
    ModeRequested = 2,
}

/// Snapshot of the pending flags, taken atomically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pending {
    pub tick: bool,
    pub spray: bool,
    pub mode: bool,
}

impl Pending {
    pub const NONE: Self = Self {
        tick: false,
        spray: false,
        mode: false,
    };

    pub fn is_empty(&self) -> bool {
        !(self.tick || self.spray || self.mode)
    }

    fn with(mut self, event: Event) -> Self {
        match event {
            Event::Tick => self.tick = true,
            Event::SprayRequested => self.spray = true,
            Event::ModeRequested => self.mode = true,
        }
        self
    }
}

/// Pending-event flags shared between interrupt producers and the main loop.
pub struct EventFlags {
    pending: Mutex<CriticalSectionRawMutex, Cell<Pending>>,
    deferred: AtomicU8,
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(Pending::NONE)),
            deferred: AtomicU8::new(0),
        }
    }

    /// Record an event. Safe to call from ISR / timer-task context.
    pub fn raise(&self, event: Event) {
        self.pending.lock(|p| p.set(p.get().with(event)));
    }

    /// Take and clear every pending flag in one critical section.
    /// Returns [`Pending::NONE`] while a [`ServiceGuard`] is held.
    pub fn take(&self) -> Pending {
        if self.is_deferred() {
            return Pending::NONE;
        }
        self.pending.lock(|p| p.replace(Pending::NONE))
    }

    /// Peek without clearing.
    pub fn peek(&self) -> Pending {
        self.pending.lock(Cell::get)
    }

    /// `true` when something is waiting and consumption is not deferred.
    pub fn has_pending(&self) -> bool {
        !self.is_deferred() && !self.peek().is_empty()
    }

    /// Defer consumption until the returned guard is dropped.
    pub fn defer(&self) -> ServiceGuard<'_> {
        self.deferred.fetch_add(1, Ordering::AcqRel);
        ServiceGuard { flags: self }
    }

    pub fn is_deferred(&self) -> bool {
        self.deferred.load(Ordering::Acquire) != 0
    }
}

/// Scope during which no events are consumed (actuation, mode change).
#[must_use = "events are only deferred while the guard is alive"]
pub struct ServiceGuard<'a> {
    flags: &'a EventFlags,
}

impl Drop for ServiceGuard<'_> {
    fn drop(&mut self) {
        self.flags.deferred.fetch_sub(1, Ordering::AcqRel);
    }
}
