//! Mock hardware adapter for integration tests.
//!
//! Records every indicator pulse, motor edge and timed wait so tests can
//! assert on the full call history without touching real GPIO registers.
//! Darkness readings are scripted per tick.

use std::collections::VecDeque;

use embedded_hal::delay::DelayNs;
use spritz::app::events::AppEvent;
use spritz::app::ports::{
    EventSink, IndicatorPort, LightSensorPort, MODE_UNSET, ModeStorePort, SprayPort, StorageError,
};
use spritz::sensors::DarknessScore;

/// Reading well above any calibrated threshold.
pub const DARK: u16 = 29_000;
/// Reading well below any calibrated threshold.
pub const BRIGHT: u16 = 1_000;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwCall {
    Sample(u16),
    Blink,
    MotorOn,
    MotorOff,
    DelayMs(u32),
}

// ── MockHardware ──────────────────────────────────────────────

pub struct MockHardware {
    pub calls: Vec<HwCall>,
    script: VecDeque<u16>,
    /// Reading returned once the script runs out.
    pub ambient: u16,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn new(ambient: u16) -> Self {
        Self {
            calls: Vec::new(),
            script: VecDeque::new(),
            ambient,
        }
    }

    /// Queue readings returned by the next `sample()` calls, in order.
    pub fn script(&mut self, readings: impl IntoIterator<Item = u16>) {
        self.script.extend(readings);
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    pub fn motor_runs(&self) -> usize {
        self.calls.iter().filter(|c| **c == HwCall::MotorOn).count()
    }

    pub fn blinks(&self) -> usize {
        self.calls.iter().filter(|c| **c == HwCall::Blink).count()
    }

    /// Whether the last motor edge left it running.
    pub fn motor_is_on(&self) -> bool {
        self.calls
            .iter()
            .rev()
            .find_map(|c| match c {
                HwCall::MotorOn => Some(true),
                HwCall::MotorOff => Some(false),
                _ => None,
            })
            .unwrap_or(false)
    }

    pub fn total_delay_ms(&self) -> u64 {
        self.calls
            .iter()
            .map(|c| match c {
                HwCall::DelayMs(ms) => u64::from(*ms),
                _ => 0,
            })
            .sum()
    }
}

impl LightSensorPort for MockHardware {
    fn sample(&mut self) -> DarknessScore {
        let raw = self.script.pop_front().unwrap_or(self.ambient);
        self.calls.push(HwCall::Sample(raw));
        DarknessScore(raw)
    }
}

impl IndicatorPort for MockHardware {
    fn blink(&mut self) {
        self.calls.push(HwCall::Blink);
    }
}

impl SprayPort for MockHardware {
    fn motor_on(&mut self) {
        self.calls.push(HwCall::MotorOn);
    }

    fn motor_off(&mut self) {
        self.calls.push(HwCall::MotorOff);
    }
}

impl DelayNs for MockHardware {
    fn delay_ns(&mut self, _ns: u32) {}

    fn delay_ms(&mut self, ms: u32) {
        self.calls.push(HwCall::DelayMs(ms));
    }
}

// ── MockStore ─────────────────────────────────────────────────

pub struct MockStore {
    pub byte: u8,
    pub writes: Vec<u8>,
    pub fail_writes: bool,
}

#[allow(dead_code)]
impl MockStore {
    pub fn erased() -> Self {
        Self::holding(MODE_UNSET)
    }

    pub fn holding(byte: u8) -> Self {
        Self {
            byte,
            writes: Vec::new(),
            fail_writes: false,
        }
    }
}

impl ModeStorePort for MockStore {
    fn read_mode(&self) -> Result<u8, StorageError> {
        Ok(self.byte)
    }

    fn write_mode(&mut self, value: u8) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::IoError);
        }
        self.byte = value;
        self.writes.push(value);
        Ok(())
    }
}

// ── Recording sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actuations(&self) -> Vec<spritz::fsm::context::Trigger> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Actuated(t) => Some(*t),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

// ── Fixtures ──────────────────────────────────────────────────

/// Baseline used by every fixture: threshold = 10_000 + 5_000.
pub const BASELINE: u16 = 10_000;

/// A started service in `mode` with default config and a fixed threshold.
#[allow(dead_code)]
pub fn make_service(mode: u8) -> spritz::app::service::DispenserService {
    make_service_with(spritz::config::DispenserConfig::default(), mode)
}

#[allow(dead_code)]
pub fn make_service_with(
    config: spritz::config::DispenserConfig,
    mode: u8,
) -> spritz::app::service::DispenserService {
    use spritz::app::mode::Mode;
    use spritz::sensors::BrightnessThreshold;

    let threshold =
        BrightnessThreshold::calibrate(DarknessScore(BASELINE), config.calibration_margin);
    let mut svc = spritz::app::service::DispenserService::new(config, Mode::from_index(mode), threshold);
    svc.start(&mut RecordingSink::new());
    svc
}
