//! Outbound application events.
//!
//! The [`DispenserService`](super::service::DispenserService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them; on the device they become log
//! lines.

use crate::fsm::context::Trigger;
use crate::sensors::DarknessScore;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// Power-on calibration finished.
    Calibrated { baseline: DarknessScore, threshold: u16 },

    /// The service has started (carries mode index and threshold).
    Started { mode: u8, threshold: u16 },

    /// The spray motor ran once.
    Actuated(Trigger),

    /// Schedule period elapsed but the room was occupied.
    ScheduleSuppressed { light_ticks: u16 },

    /// Room light turned on.
    LightOn { score: DarknessScore },

    /// Room light turned off after `dwell_ticks`.
    LightOff { dwell_ticks: u16, sprayed: bool },

    /// Mode button advanced the mode.
    ModeChanged { from: u8, to: u8, persisted: bool },
}
