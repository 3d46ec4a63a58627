//! Operating mode: which schedule period is in force.

use log::{info, warn};

use crate::config::{DispenserConfig, MODE_COUNT};

use super::ports::{MODE_UNSET, ModeStorePort};

/// Index into [`DispenserConfig::schedule_periods`], always `< MODE_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mode(u8);

impl Mode {
    /// Wraps out-of-range indices back into range.
    pub fn from_index(index: u8) -> Self {
        Self(index % MODE_COUNT as u8)
    }

    /// Interpret a byte read from the mode store.
    ///
    /// An erased cell yields `default`. Any other out-of-range byte is
    /// treated the same way, with a warning.
    pub fn from_stored(byte: u8, default: u8) -> Self {
        if usize::from(byte) < MODE_COUNT {
            return Self(byte);
        }
        if byte != MODE_UNSET {
            warn!("stored mode byte {byte:#04x} out of range, using default {default}");
        }
        Self::from_index(default)
    }

    /// The mode after this one, wrapping to 0.
    pub fn next(self) -> Self {
        Self::from_index(self.0 + 1)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Schedule period in ticks for this mode.
    pub fn schedule_period(self, config: &DispenserConfig) -> u32 {
        config.schedule_periods[usize::from(self.0)]
    }
}

/// Read the persisted mode, falling back to the configured default when the
/// store is erased, corrupt or unreadable.
pub fn load_mode(store: &impl ModeStorePort, config: &DispenserConfig) -> Mode {
    match store.read_mode() {
        Ok(byte) => {
            let mode = Mode::from_stored(byte, config.default_mode);
            info!("mode {} loaded (stored byte {byte:#04x})", mode.index());
            mode
        }
        Err(e) => {
            warn!("mode store read failed ({e}), using default {}", config.default_mode);
            Mode::from_index(config.default_mode)
        }
    }
}
