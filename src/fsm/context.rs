//! Shared mutable context threaded through every FSM handler.
//!
//! `FsmContext` owns the whole decision state of the dispenser: both tick
//! timers, the calibrated threshold, the current mode and the latest light
//! reading. Handlers never touch hardware; they append [`Request`]s which the
//! service applies in order once the tick's decisions are complete.

use heapless::Vec;
use log::warn;

use crate::app::mode::Mode;
use crate::config::DispenserConfig;
use crate::sensors::{BrightnessThreshold, DarknessScore};

/// Upper bound on requests per tick: heartbeat, scheduled spray, edge action.
pub const MAX_REQUESTS: usize = 4;

// ---------------------------------------------------------------------------
// Requests (written by handlers; applied by the service)
// ---------------------------------------------------------------------------

/// What prompted an actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Schedule period elapsed while the room was dark.
    Schedule,
    /// Schedule period elapsed with the light on past the forgotten-light limit.
    ForgottenLight,
    /// Light went off after a long enough visit.
    LightOff,
    /// Spray button.
    Manual,
    /// Optional spray right after calibration.
    BootTest,
}

/// Indicator feedback kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlinkKind {
    /// One pulse per tick.
    Heartbeat,
    /// Secondary pulse: light just turned on.
    LightOn,
    /// Secondary pulse: light turned off, visit too short or too soon.
    Declined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    Blink(BlinkKind),
    Actuate(Trigger),
}

// ---------------------------------------------------------------------------
// FsmContext
// ---------------------------------------------------------------------------

/// The shared context passed to every state handler function.
pub struct FsmContext {
    // -- Configuration --
    pub config: DispenserConfig,
    /// Set once at power-on, never re-calibrated.
    pub threshold: BrightnessThreshold,
    pub mode: Mode,

    // -- Timers (ticks) --
    /// Ticks since the last actuation of any kind.
    pub main_timer: u32,
    /// Ticks the light has been continuously on, saturating at `max_light_ticks`.
    pub light_timer: u16,
    /// Light timer value at the most recent falling edge.
    pub last_dwell: u16,

    // -- Latest reading --
    pub last_score: DarknessScore,
    pub light_now_on: bool,

    // -- Outputs --
    pub requests: Vec<Request, MAX_REQUESTS>,
}

impl FsmContext {
    pub fn new(config: DispenserConfig, threshold: BrightnessThreshold, mode: Mode) -> Self {
        Self {
            config,
            threshold,
            mode,
            main_timer: 0,
            light_timer: 0,
            last_dwell: 0,
            last_score: DarknessScore::default(),
            light_now_on: false,
            requests: Vec::new(),
        }
    }

    /// Store a reading and classify it against the threshold.
    pub fn record_sample(&mut self, score: DarknessScore) {
        self.last_score = score;
        self.light_now_on = self.threshold.is_light_on(score);
    }

    /// Schedule period of the current mode.
    pub fn schedule_period(&self) -> u32 {
        self.mode.schedule_period(&self.config)
    }

    /// Advance the light timer, clamped to the forgotten-light ceiling.
    pub fn bump_light_timer(&mut self) {
        self.light_timer = self
            .light_timer
            .saturating_add(1)
            .min(self.config.max_light_ticks);
    }

    pub fn light_left_on(&self) -> bool {
        self.light_timer >= self.config.max_light_ticks
    }

    /// Zero both timers (mode change).
    pub fn reset_timers(&mut self) {
        self.main_timer = 0;
        self.light_timer = 0;
    }

    pub fn request(&mut self, request: Request) {
        if self.requests.push(request).is_err() {
            warn!("request queue full, dropping {:?}", request);
        }
    }
}
