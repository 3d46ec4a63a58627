//! Inbound commands to the application service.
//!
//! Each variant maps to one pending input flag. The
//! [`DispenserService`](super::service::DispenserService) interprets them and
//! drives the hardware ports accordingly.

use crate::events::Pending;

/// Commands the main loop sends into the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Spray button pressed: actuate now and restart the schedule.
    ManualSpray,

    /// Mode button pressed: cycle to the next schedule period.
    AdvanceMode,

    /// Periodic tick: sample the light and run the decision engine.
    Tick,
}

impl AppCommand {
    /// Commands for a pending snapshot, in service order.
    pub fn from_pending(pending: Pending) -> heapless::Vec<Self, 3> {
        let mut out = heapless::Vec::new();
        // Capacity equals the number of flags, so pushes cannot fail.
        if pending.spray {
            let _ = out.push(Self::ManualSpray);
        }
        if pending.mode {
            let _ = out.push(Self::AdvanceMode);
        }
        if pending.tick {
            let _ = out.push(Self::Tick);
        }
        out
    }
}
