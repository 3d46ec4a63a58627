//! Hardware adapter: bridges real peripherals to domain port traits.
//!
//! Owns the light sensor, the indicator LED, the spray motor and a delay
//! provider, exposing them through [`LightSensorPort`], [`IndicatorPort`],
//! [`SprayPort`] and [`DelayNs`]. This is the only module in the system
//! that touches actual hardware. On non-espidf targets, the underlying
//! drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;

use crate::app::ports::{IndicatorPort, LightSensorPort, SprayPort};
use crate::drivers::indicator::Indicator;
use crate::drivers::sprayer::Sprayer;
use crate::sensors::DarknessScore;
use crate::sensors::light::LightSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<D> {
    sensor: LightSensor,
    led: Indicator,
    sprayer: Sprayer,
    delay: D,
}

impl<D: DelayNs> HardwareAdapter<D> {
    pub fn new(sensor: LightSensor, led: Indicator, sprayer: Sprayer, delay: D) -> Self {
        Self {
            sensor,
            led,
            sprayer,
            delay,
        }
    }

    /// Force the motor off (startup, or after an unexpected reset).
    pub fn all_off(&mut self) {
        self.sprayer.stop();
    }

    pub fn sprayer(&self) -> &Sprayer {
        &self.sprayer
    }

    pub fn indicator(&self) -> &Indicator {
        &self.led
    }

    pub fn sensor(&self) -> &LightSensor {
        &self.sensor
    }
}

// ── LightSensorPort implementation ────────────────────────────

impl<D> LightSensorPort for HardwareAdapter<D> {
    fn sample(&mut self) -> DarknessScore {
        self.sensor.read()
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<D> IndicatorPort for HardwareAdapter<D> {
    fn blink(&mut self) {
        self.led.pulse();
    }
}

// ── SprayPort implementation ──────────────────────────────────

impl<D> SprayPort for HardwareAdapter<D> {
    fn motor_on(&mut self) {
        self.sprayer.start();
    }

    fn motor_off(&mut self) {
        self.sprayer.stop();
    }
}

// ── DelayNs delegation ────────────────────────────────────────

impl<D: DelayNs> DelayNs for HardwareAdapter<D> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay.delay_ns(ns);
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
