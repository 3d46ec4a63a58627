//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART / USB-CDC). Developer output only; the device
//! itself only ever talks through its LED.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink {
    emitted: u32,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events written since boot.
    pub fn emitted(&self) -> u32 {
        self.emitted
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        self.emitted = self.emitted.wrapping_add(1);
        match event {
            AppEvent::Calibrated { baseline, threshold } => {
                info!("CALIB | baseline={} threshold={}", baseline.0, threshold);
            }
            AppEvent::Started { mode, threshold } => {
                info!("START | mode={} threshold={}", mode, threshold);
            }
            AppEvent::Actuated(trigger) => {
                info!("SPRAY | trigger={:?}", trigger);
            }
            AppEvent::ScheduleSuppressed { light_ticks } => {
                debug!("SCHED | suppressed, light_ticks={}", light_ticks);
            }
            AppEvent::LightOn { score } => {
                debug!("LIGHT | on, score={}", score.0);
            }
            AppEvent::LightOff {
                dwell_ticks,
                sprayed,
            } => {
                info!("LIGHT | off, dwell={} sprayed={}", dwell_ticks, sprayed);
            }
            AppEvent::ModeChanged {
                from,
                to,
                persisted,
            } => {
                if *persisted {
                    info!("MODE  | {} -> {}", from, to);
                } else {
                    warn!("MODE  | {} -> {} (not persisted)", from, to);
                }
            }
        }
    }
}
