//! Light sensing: the darkness score, the calibrated threshold, and the
//! LED-as-photodiode driver in [`light`].

pub mod light;

/// Relative darkness reading. Larger = darker, bounded by the sensor ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct DarknessScore(pub u16);

/// Darkness level separating "light on" from "light off".
///
/// Only obtainable through [`BrightnessThreshold::calibrate`], so a running
/// engine always holds a threshold taken from a real power-on reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightnessThreshold(u16);

impl BrightnessThreshold {
    /// Derive the threshold from one baseline reading plus a fixed margin.
    pub fn calibrate(baseline: DarknessScore, margin: u16) -> Self {
        Self(baseline.0.saturating_add(margin))
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Strictly brighter than the threshold means the room light is on.
    pub fn is_light_on(self, score: DarknessScore) -> bool {
        score.0 < self.0
    }
}
