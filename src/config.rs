//! System configuration parameters
//!
//! All tunable parameters for the dispenser. Timers count ticks, delays are
//! milliseconds. Values are compiled in; only the mode index is persisted.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Number of timer modes the mode button cycles through.
pub const MODE_COUNT: usize = 3;

/// Core dispenser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispenserConfig {
    // --- Timing ---
    /// Wall-clock length of one tick (milliseconds).
    pub tick_period_ms: u32,
    /// Scheduled spray period per mode, in ticks.
    pub schedule_periods: [u32; MODE_COUNT],
    /// Mode used when the store holds no valid index.
    pub default_mode: u8,

    // --- Occupancy ---
    /// Light must stay on strictly longer than this (ticks) to count as a visit.
    pub min_light_ticks: u16,
    /// Light on this long (ticks) is presumed forgotten; LightTimer saturates here.
    pub max_light_ticks: u16,
    /// Minimum ticks since the previous spray before a light-off spray.
    pub min_gap_ticks: u32,

    // --- Light sensor ---
    /// Offset added to the power-on darkness reading to form the threshold.
    pub calibration_margin: u16,
    /// Upper bound of a darkness reading (total darkness).
    pub darkness_ceiling: u16,
    /// Reverse-bias charge time before a discharge measurement (microseconds).
    pub sensor_charge_us: u32,

    // --- Actuator ---
    /// Spray motor run time per actuation.
    pub motor_on_ms: u32,
    /// Warning blinks before the motor runs.
    pub prewarn_blinks: u8,
    /// Gap after each warning blink.
    pub prewarn_interval_ms: u32,

    // --- Indicator ---
    /// Width of one indicator pulse (microseconds).
    pub blink_pulse_us: u32,
    /// Delay before the secondary light-edge blink.
    pub edge_blink_delay_ms: u32,
    /// Countdown blinks before the calibration sample.
    pub calibration_blinks: u8,
    /// Gap after each countdown blink.
    pub calibration_interval_ms: u32,
    /// Gap after each mode feedback blink.
    pub mode_blink_interval_ms: u32,
    /// Quiet period after a mode change before inputs are serviced again.
    pub mode_quiescent_ms: u32,

    // --- Inputs ---
    /// Edges on the same button closer than this are ignored.
    pub button_debounce_ms: u32,

    // --- Boot ---
    /// Run one actuation right after calibration.
    pub test_spray_on_boot: bool,
}

impl Default for DispenserConfig {
    fn default() -> Self {
        Self {
            // Timing
            tick_period_ms: 9_600, // 375 ticks ≈ 1 h
            schedule_periods: [375, 1_125, 2_250], // ~1 h, 3 h, 6 h
            default_mode: 1,

            // Occupancy
            min_light_ticks: 16, // ~2.5 min
            max_light_ticks: 375, // ~1 h
            min_gap_ticks: 94,   // ~15 min

            // Light sensor
            calibration_margin: 5_000,
            darkness_ceiling: 30_000,
            sensor_charge_us: 1_000,

            // Actuator
            motor_on_ms: 500,
            prewarn_blinks: 10,
            prewarn_interval_ms: 200,

            // Indicator
            blink_pulse_us: 1_000,
            edge_blink_delay_ms: 200,
            calibration_blinks: 10,
            calibration_interval_ms: 1_000,
            mode_blink_interval_ms: 500,
            mode_quiescent_ms: 2_000,

            // Inputs
            button_debounce_ms: 50,

            // Boot
            test_spray_on_boot: false,
        }
    }
}

impl DispenserConfig {
    /// Range-check every field that the engine relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_period_ms must be > 0"));
        }
        if self.schedule_periods.iter().any(|&p| p == 0) {
            return Err(ConfigError::ValidationFailed(
                "schedule_periods must all be > 0",
            ));
        }
        if self.default_mode as usize >= MODE_COUNT {
            return Err(ConfigError::ValidationFailed(
                "default_mode must be < MODE_COUNT",
            ));
        }
        if self.max_light_ticks == 0 {
            return Err(ConfigError::ValidationFailed("max_light_ticks must be > 0"));
        }
        if self.min_light_ticks >= self.max_light_ticks {
            return Err(ConfigError::ValidationFailed(
                "min_light_ticks must be < max_light_ticks",
            ));
        }
        if self.darkness_ceiling == 0 {
            return Err(ConfigError::ValidationFailed("darkness_ceiling must be > 0"));
        }
        if self.motor_on_ms == 0 || self.motor_on_ms > 5_000 {
            return Err(ConfigError::ValidationFailed("motor_on_ms must be 1–5000"));
        }
        if self.blink_pulse_us == 0 || self.blink_pulse_us > 100_000 {
            return Err(ConfigError::ValidationFailed(
                "blink_pulse_us must be 1–100000",
            ));
        }
        Ok(())
    }

    /// Tick period in seconds, for logging.
    pub fn tick_secs(&self) -> f32 {
        self.tick_period_ms as f32 / 1000.0
    }
}
