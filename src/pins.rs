//! GPIO pin assignments for the dispenser board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Spray motor (low-side MOSFET)
// ---------------------------------------------------------------------------

/// Digital output: HIGH = motor energised.
pub const MOTOR_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Indicator LED, also the light sensor
// ---------------------------------------------------------------------------

/// LED anode. Held LOW while sensing, pulsed HIGH to blink.
pub const LED_ANODE_GPIO: i32 = 4;
/// LED cathode. Charged HIGH then floated to measure discharge time.
pub const LED_CATHODE_GPIO: i32 = 3;

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Manual spray button.
pub const BUTTON_SPRAY_GPIO: i32 = 0;
/// Mode advance button.
pub const BUTTON_MODE_GPIO: i32 = 1;
