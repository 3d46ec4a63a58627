//! Integration tests for the tick engine: schedule, occupancy edges and the
//! actuation sequence, driven through `DispenserService` with mock hardware.

use spritz::app::events::AppEvent;
use spritz::app::service::DispenserService;
use spritz::config::DispenserConfig;
use spritz::events::{Event, EventFlags, Pending};
use spritz::fsm::StateId;
use spritz::fsm::context::Trigger;
use spritz::scheduler::ScheduleOutcome;

use super::mock_hw::{
    BRIGHT, DARK, HwCall, MockHardware, MockStore, RecordingSink, make_service, make_service_with,
};

/// Run `n` ticks, each reading `raw`.
fn run(
    svc: &mut DispenserService,
    hw: &mut MockHardware,
    flags: &EventFlags,
    sink: &mut RecordingSink,
    raw: u16,
    n: usize,
) {
    hw.script(std::iter::repeat_n(raw, n));
    for _ in 0..n {
        svc.tick(hw, flags, sink);
    }
}

// ── Light timer clamping ──────────────────────────────────────

#[test]
fn light_timer_saturates_at_forgotten_limit() {
    let mut svc = make_service(2);
    let mut hw = MockHardware::new(BRIGHT);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 1_000);

    assert_eq!(svc.light_timer(), svc.config().max_light_ticks);
    assert_eq!(svc.state(), StateId::LightOn);
}

// ── Minimum dwell ─────────────────────────────────────────────

#[test]
fn visit_at_minimum_dwell_is_declined() {
    let mut svc = make_service(2);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 200);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 16);
    assert_eq!(svc.light_timer(), 16);

    hw.clear();
    let report = svc.tick(&mut hw, &flags, &mut sink);

    assert_eq!(report.actuations, 0);
    assert_eq!(svc.light_timer(), 0);
    assert_eq!(svc.last_dwell(), 16);
    // heartbeat, then the delayed "declined" pulse
    assert_eq!(
        hw.calls,
        vec![
            HwCall::Sample(DARK),
            HwCall::Blink,
            HwCall::DelayMs(200),
            HwCall::Blink,
        ]
    );
}

#[test]
fn visit_past_minimum_dwell_sprays() {
    let mut svc = make_service(2);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 200);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 17);
    let report = svc.tick(&mut hw, &flags, &mut sink);

    assert_eq!(report.actuations, 1);
    assert_eq!(svc.main_timer(), 0);
    assert_eq!(sink.actuations(), vec![Trigger::LightOff]);
    assert!(sink.events.contains(&AppEvent::LightOff {
        dwell_ticks: 17,
        sprayed: true
    }));
}

// ── Minimum gap ───────────────────────────────────────────────

#[test]
fn recent_spray_blocks_light_off_spray() {
    let mut svc = make_service(2);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    svc.manual_spray(&mut hw, &flags, &mut sink);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 50);
    let report = svc.tick(&mut hw, &flags, &mut sink);

    assert_eq!(report.actuations, 0);
    assert_eq!(svc.main_timer(), 51);
    assert_eq!(sink.actuations(), vec![Trigger::Manual]);
    assert!(sink.events.contains(&AppEvent::LightOff {
        dwell_ticks: 50,
        sprayed: false
    }));
}

#[test]
fn gap_must_be_strictly_exceeded() {
    let mut svc = make_service(2);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    // Light on from tick 75 through 93, off at tick 94: main_timer == 94.
    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 74);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 19);
    let report = svc.tick(&mut hw, &flags, &mut sink);
    assert_eq!(svc.last_dwell(), 19);
    assert_eq!(report.actuations, 0);

    // Same again, off at main_timer 95 (no reset happened).
    let mut svc = make_service(2);
    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 75);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 19);
    let report = svc.tick(&mut hw, &flags, &mut sink);
    assert_eq!(report.actuations, 1);
}

// ── Schedule ──────────────────────────────────────────────────

#[test]
fn schedule_fires_exactly_on_period_while_dark() {
    let mut svc = make_service(0);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 374);
    assert_eq!(hw.motor_runs(), 0);
    assert_eq!(svc.main_timer(), 374);

    let report = svc.tick(&mut hw, &flags, &mut sink);
    assert_eq!(report.schedule, ScheduleOutcome::Spray(Trigger::Schedule));
    assert_eq!(report.actuations, 1);
    assert_eq!(svc.main_timer(), 0);
    assert!(!hw.motor_is_on());
}

#[test]
fn schedule_suppressed_during_short_visit_still_restarts() {
    let mut svc = make_service(0);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 370);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 5);

    assert_eq!(hw.motor_runs(), 0);
    assert_eq!(svc.main_timer(), 0);
    assert!(
        sink.events
            .contains(&AppEvent::ScheduleSuppressed { light_ticks: 4 })
    );
}

#[test]
fn forgotten_light_overrides_occupancy() {
    let mut svc = make_service(0);
    let mut hw = MockHardware::new(BRIGHT);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    // First due tick: light on for 374 ticks, still below the limit.
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 375);
    assert_eq!(hw.motor_runs(), 0);
    assert_eq!(svc.main_timer(), 0);
    assert!(
        sink.events
            .contains(&AppEvent::ScheduleSuppressed { light_ticks: 374 })
    );

    // Next due tick: the light has been on past the limit.
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 374);
    let report = svc.tick(&mut hw, &flags, &mut sink);
    assert_eq!(
        report.schedule,
        ScheduleOutcome::Spray(Trigger::ForgottenLight)
    );
    assert_eq!(report.actuations, 1);
    assert_eq!(svc.light_timer(), svc.config().max_light_ticks);
    assert_eq!(svc.main_timer(), 0);
    assert_eq!(svc.state(), StateId::LightOn);
}

#[test]
fn scheduled_spray_resets_timer_before_light_off_check() {
    let mut svc = make_service(0);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    // Long visit ends on the very tick the schedule falls due.
    run(&mut svc, &mut hw, &flags, &mut sink, DARK, 344);
    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 30);
    let report = svc.tick(&mut hw, &flags, &mut sink);

    assert_eq!(report.schedule, ScheduleOutcome::Spray(Trigger::Schedule));
    assert_eq!(report.actuations, 1);
    assert_eq!(sink.actuations(), vec![Trigger::Schedule]);
    assert_eq!(svc.light_timer(), 0);
}

// ── Manual spray ──────────────────────────────────────────────

#[test]
fn manual_spray_always_actuates_and_keeps_light_timer() {
    let mut svc = make_service(1);
    let mut hw = MockHardware::new(BRIGHT);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    run(&mut svc, &mut hw, &flags, &mut sink, BRIGHT, 20);
    hw.clear();
    svc.manual_spray(&mut hw, &flags, &mut sink);

    assert_eq!(svc.main_timer(), 0);
    assert_eq!(svc.light_timer(), 20);

    let mut expected = Vec::new();
    for _ in 0..10 {
        expected.push(HwCall::Blink);
        expected.push(HwCall::DelayMs(200));
    }
    expected.extend([HwCall::MotorOn, HwCall::DelayMs(500), HwCall::MotorOff]);
    assert_eq!(hw.calls, expected);
}

// ── Wake-cycle ordering and deferral ──────────────────────────

#[test]
fn service_runs_spray_then_mode_then_tick() {
    let mut svc = make_service(0);
    let mut hw = MockHardware::new(DARK);
    let mut store = MockStore::erased();
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    let pending = Pending {
        tick: true,
        spray: true,
        mode: true,
    };
    svc.service(pending, &mut hw, &mut store, &flags, &mut sink);

    assert!(matches!(sink.events[0], AppEvent::Actuated(Trigger::Manual)));
    assert!(matches!(sink.events[1], AppEvent::ModeChanged { from: 0, to: 1, .. }));
    // the tick ran after the mode change reset, so it counts from zero
    assert_eq!(svc.main_timer(), 1);
    assert_eq!(svc.tick_count(), 1);
    assert_eq!(hw.calls.last(), Some(&HwCall::Blink));
}

#[test]
fn press_during_actuation_stays_pending() {
    use embedded_hal::delay::DelayNs;
    use spritz::app::ports::{IndicatorPort, LightSensorPort, SprayPort};

    static FLAGS: EventFlags = EventFlags::new();

    struct PressingHw {
        inner: MockHardware,
        deferred_at_motor: Option<bool>,
    }

    impl LightSensorPort for PressingHw {
        fn sample(&mut self) -> spritz::sensors::DarknessScore {
            self.inner.sample()
        }
    }
    impl IndicatorPort for PressingHw {
        fn blink(&mut self) {
            self.inner.blink();
        }
    }
    impl SprayPort for PressingHw {
        fn motor_on(&mut self) {
            self.deferred_at_motor = Some(FLAGS.is_deferred());
            FLAGS.raise(Event::SprayRequested);
            SprayPort::motor_on(&mut self.inner);
        }
        fn motor_off(&mut self) {
            SprayPort::motor_off(&mut self.inner);
        }
    }
    impl DelayNs for PressingHw {
        fn delay_ns(&mut self, ns: u32) {
            self.inner.delay_ns(ns);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.inner.delay_ms(ms);
        }
    }

    let mut svc = make_service(0);
    let mut hw = PressingHw {
        inner: MockHardware::new(DARK),
        deferred_at_motor: None,
    };
    let mut sink = RecordingSink::new();

    svc.manual_spray(&mut hw, &FLAGS, &mut sink);

    assert_eq!(hw.deferred_at_motor, Some(true));
    assert_eq!(hw.inner.motor_runs(), 1);
    assert!(!hw.inner.motor_is_on());
    assert!(!FLAGS.is_deferred());
    let next = FLAGS.take();
    assert!(next.spray);
}

// ── Config-driven sequence ────────────────────────────────────

#[test]
fn prewarn_sequence_follows_config() {
    let config = DispenserConfig {
        prewarn_blinks: 3,
        prewarn_interval_ms: 100,
        motor_on_ms: 250,
        ..Default::default()
    };
    let mut svc = make_service_with(config, 0);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    svc.manual_spray(&mut hw, &flags, &mut sink);

    assert_eq!(hw.blinks(), 3);
    assert_eq!(hw.total_delay_ms(), 3 * 100 + 250);
}
