//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ DispenserService (domain)
//! ```
//!
//! Driven adapters (light sensor, indicator LED, spray motor, mode store,
//! event sinks) implement these traits. The
//! [`DispenserService`](super::service::DispenserService) consumes them via
//! generics, so the decision core never touches hardware directly.
//!
//! Timed waits are not a port of their own: the service takes any
//! [`embedded_hal::delay::DelayNs`] alongside the hardware ports.

use embedded_hal::delay::DelayNs;

use crate::sensors::DarknessScore;

// ───────────────────────────────────────────────────────────────
// Light sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: the domain calls this to measure ambient light.
pub trait LightSensorPort {
    /// Take one darkness reading. Never fails; saturation is a valid value.
    fn sample(&mut self) -> DarknessScore;
}

// ───────────────────────────────────────────────────────────────
// Actuator ports (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Single-LED indicator. The only user-visible signal the device has.
pub trait IndicatorPort {
    /// Emit one fixed-width pulse.
    fn blink(&mut self);
}

/// Spray mechanism drive output.
pub trait SprayPort {
    /// Energise the spray motor.
    fn motor_on(&mut self);

    /// De-energise the spray motor.
    fn motor_off(&mut self);
}

/// Everything the service drives in one tick: sensor, LED, motor and
/// timed waits. Taking a single `&mut` avoids juggling four borrows.
pub trait DispenserHardware: LightSensorPort + IndicatorPort + SprayPort + DelayNs {}

impl<T> DispenserHardware for T where T: LightSensorPort + IndicatorPort + SprayPort + DelayNs {}

// ───────────────────────────────────────────────────────────────
// Mode store port (driven adapter: domain ↔ persistent byte)
// ───────────────────────────────────────────────────────────────

/// Value an erased / never-written mode cell reads back as.
pub const MODE_UNSET: u8 = 0xFF;

/// One byte of non-volatile storage holding the mode index.
///
/// An erased cell reads back as [`MODE_UNSET`]. Writes MUST be atomic with
/// respect to the reader; power loss mid-write is out of scope.
pub trait ModeStorePort {
    /// Read the stored byte. An erased cell returns `Ok(MODE_UNSET)`.
    fn read_mode(&self) -> Result<u8, StorageError>;

    /// Persist a new byte.
    fn write_mode(&mut self, value: u8) -> Result<(), StorageError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from configuration validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

/// Errors from [`ModeStorePort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// The storage backend could not be opened.
    Unavailable,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
