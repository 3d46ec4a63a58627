//! Application service: the hexagonal core.
//!
//! [`DispenserService`] owns the occupancy FSM and the shared context.
//! All I/O flows through port traits injected at call sites, making the
//! whole service testable with mock adapters.
//!
//! ```text
//!  LightSensorPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                      │    DispenserService      │
//!  IndicatorPort   ◀── │  Scheduler · FSM · Mode  │ ◀──▶ ModeStorePort
//!  SprayPort       ◀── └──────────────────────────┘
//! ```
//!
//! Each tick makes every decision first (timers, schedule, light edge) and
//! then applies the queued [`Request`]s in order. Actuations and mode
//! changes hold a [`ServiceGuard`](crate::events::ServiceGuard) so input
//! edges arriving meanwhile stay pending for the next wake cycle.

use log::{info, warn};

use crate::config::DispenserConfig;
use crate::events::{EventFlags, Pending};
use crate::fsm::context::{BlinkKind, FsmContext, Request, Trigger};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};
use crate::scheduler::{self, ScheduleOutcome};
use crate::sensors::{BrightnessThreshold, DarknessScore};

use super::commands::AppCommand;
use super::events::AppEvent;
use super::mode::Mode;
use super::ports::{DispenserHardware, EventSink, ModeStorePort};

/// What a single tick observed and did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub score: DarknessScore,
    pub light_on: bool,
    pub schedule: ScheduleOutcome,
    /// Motor runs performed during this tick (0, 1 or 2).
    pub actuations: u8,
}

// ───────────────────────────────────────────────────────────────
// DispenserService
// ───────────────────────────────────────────────────────────────

pub struct DispenserService {
    fsm: Fsm,
    ctx: FsmContext,
    tick_count: u64,
    actuation_count: u32,
}

impl DispenserService {
    /// Power-on calibration: countdown blinks so the user can leave, then one
    /// sample plus the configured margin.
    pub fn calibrate(
        hw: &mut impl DispenserHardware,
        config: &DispenserConfig,
        sink: &mut impl EventSink,
    ) -> BrightnessThreshold {
        for _ in 0..config.calibration_blinks {
            hw.blink();
            hw.delay_ms(config.calibration_interval_ms);
        }
        let baseline = hw.sample();
        let threshold = BrightnessThreshold::calibrate(baseline, config.calibration_margin);
        info!(
            "calibrated: baseline {} threshold {}",
            baseline.0,
            threshold.value()
        );
        sink.emit(&AppEvent::Calibrated {
            baseline,
            threshold: threshold.value(),
        });
        threshold
    }

    /// Construct the service. Does **not** start the FSM; call [`start`](Self::start).
    pub fn new(config: DispenserConfig, mode: Mode, threshold: BrightnessThreshold) -> Self {
        let ctx = FsmContext::new(config, threshold, mode);
        let fsm = Fsm::new(build_state_table(), StateId::LightOff);
        Self {
            fsm,
            ctx,
            tick_count: 0,
            actuation_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        sink.emit(&AppEvent::Started {
            mode: self.ctx.mode.index(),
            threshold: self.ctx.threshold.value(),
        });
        info!(
            "DispenserService started: mode {} period {} ticks",
            self.ctx.mode.index(),
            self.ctx.schedule_period()
        );
    }

    /// Single actuation right after start, when enabled in config.
    pub fn boot_test_spray(
        &mut self,
        hw: &mut impl DispenserHardware,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) -> bool {
        if !self.ctx.config.test_spray_on_boot {
            return false;
        }
        self.actuate(Trigger::BootTest, hw, flags, sink);
        true
    }

    // ── Wake-cycle dispatch ───────────────────────────────────

    /// Service one snapshot of pending inputs: spray, then mode, then tick.
    pub fn service(
        &mut self,
        pending: Pending,
        hw: &mut impl DispenserHardware,
        store: &mut impl ModeStorePort,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) {
        for cmd in AppCommand::from_pending(pending) {
            self.handle_command(cmd, hw, store, flags, sink);
        }
    }

    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        hw: &mut impl DispenserHardware,
        store: &mut impl ModeStorePort,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::ManualSpray => self.manual_spray(hw, flags, sink),
            AppCommand::AdvanceMode => {
                self.advance_mode(hw, store, flags, sink);
            }
            AppCommand::Tick => {
                self.tick(hw, flags, sink);
            }
        }
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Spray now. Restarts the schedule; the light timer is left alone.
    pub fn manual_spray(
        &mut self,
        hw: &mut impl DispenserHardware,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) {
        self.actuate(Trigger::Manual, hw, flags, sink);
        self.ctx.main_timer = 0;
    }

    /// Cycle to the next mode, persist it and show it on the LED.
    pub fn advance_mode(
        &mut self,
        hw: &mut impl DispenserHardware,
        store: &mut impl ModeStorePort,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) -> Mode {
        let _guard = flags.defer();
        let from = self.ctx.mode;
        let to = from.next();
        self.ctx.mode = to;

        let persisted = match store.write_mode(to.index()) {
            Ok(()) => true,
            Err(e) => {
                warn!("mode {} not persisted: {e}", to.index());
                false
            }
        };

        for _ in 0..=to.index() {
            hw.blink();
            hw.delay_ms(self.ctx.config.mode_blink_interval_ms);
        }

        self.ctx.reset_timers();
        info!(
            "mode {} -> {} (period {} ticks)",
            from.index(),
            to.index(),
            self.ctx.schedule_period()
        );
        sink.emit(&AppEvent::ModeChanged {
            from: from.index(),
            to: to.index(),
            persisted,
        });

        hw.delay_ms(self.ctx.config.mode_quiescent_ms);
        to
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one tick: count it, sample, decide, then act.
    pub fn tick(
        &mut self,
        hw: &mut impl DispenserHardware,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) -> TickReport {
        self.tick_count += 1;
        self.ctx.requests.clear();
        self.ctx.main_timer = self.ctx.main_timer.saturating_add(1);

        // 1. Sample
        let score = hw.sample();
        self.ctx.record_sample(score);

        // 2. Heartbeat
        self.ctx.request(Request::Blink(BlinkKind::Heartbeat));

        // 3. Schedule
        let schedule = scheduler::evaluate(&mut self.ctx);
        if schedule == ScheduleOutcome::Suppressed {
            sink.emit(&AppEvent::ScheduleSuppressed {
                light_ticks: self.ctx.light_timer,
            });
        }

        // 4. Light transition
        let prev_state = self.fsm.current_state();
        self.fsm.tick(&mut self.ctx);
        let new_state = self.fsm.current_state();

        match (prev_state, new_state) {
            (StateId::LightOff, StateId::LightOn) => {
                sink.emit(&AppEvent::LightOn { score });
            }
            (StateId::LightOn, StateId::LightOff) => {
                let sprayed = self
                    .ctx
                    .requests
                    .contains(&Request::Actuate(Trigger::LightOff));
                sink.emit(&AppEvent::LightOff {
                    dwell_ticks: self.ctx.last_dwell,
                    sprayed,
                });
            }
            _ => {}
        }

        // 5. Apply
        let actuations = self.apply_requests(hw, flags, sink);

        TickReport {
            score,
            light_on: self.ctx.light_now_on,
            schedule,
            actuations,
        }
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current occupancy state.
    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn mode(&self) -> Mode {
        self.ctx.mode
    }

    /// Ticks since the last actuation or mode change.
    pub fn main_timer(&self) -> u32 {
        self.ctx.main_timer
    }

    /// Ticks the light has been continuously on.
    pub fn light_timer(&self) -> u16 {
        self.ctx.light_timer
    }

    /// Light timer value at the most recent light-off.
    pub fn last_dwell(&self) -> u16 {
        self.ctx.last_dwell
    }

    pub fn threshold(&self) -> BrightnessThreshold {
        self.ctx.threshold
    }

    pub fn config(&self) -> &DispenserConfig {
        &self.ctx.config
    }

    /// Total ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Total motor runs since startup.
    pub fn actuation_count(&self) -> u32 {
        self.actuation_count
    }

    // ── Internal ──────────────────────────────────────────────

    /// Drain the tick's requests into port calls, in decision order.
    fn apply_requests(
        &mut self,
        hw: &mut impl DispenserHardware,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) -> u8 {
        let requests = core::mem::take(&mut self.ctx.requests);
        let mut actuations = 0;

        for request in requests {
            match request {
                Request::Blink(BlinkKind::Heartbeat) => hw.blink(),
                Request::Blink(BlinkKind::LightOn | BlinkKind::Declined) => {
                    hw.delay_ms(self.ctx.config.edge_blink_delay_ms);
                    hw.blink();
                }
                Request::Actuate(trigger) => {
                    self.actuate(trigger, hw, flags, sink);
                    actuations += 1;
                }
            }
        }

        actuations
    }

    /// Pre-warning blinks, then one timed motor run. Input consumption is
    /// deferred for the whole sequence.
    fn actuate(
        &mut self,
        trigger: Trigger,
        hw: &mut impl DispenserHardware,
        flags: &EventFlags,
        sink: &mut impl EventSink,
    ) {
        let _guard = flags.defer();
        let config = &self.ctx.config;

        for _ in 0..config.prewarn_blinks {
            hw.blink();
            hw.delay_ms(config.prewarn_interval_ms);
        }

        hw.motor_on();
        hw.delay_ms(config.motor_on_ms);
        hw.motor_off();

        self.actuation_count = self.actuation_count.wrapping_add(1);
        info!("actuated ({trigger:?}), total {}", self.actuation_count);
        sink.emit(&AppEvent::Actuated(trigger));
    }
}
