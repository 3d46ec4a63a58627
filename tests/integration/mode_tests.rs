//! Mode persistence and mode-button feedback against `MockStore`.

use spritz::app::events::AppEvent;
use spritz::app::mode::{Mode, load_mode};
use spritz::config::DispenserConfig;
use spritz::events::EventFlags;

use super::mock_hw::{DARK, HwCall, MockHardware, MockStore, RecordingSink, make_service};

#[test]
fn erased_store_loads_default_mode() {
    let store = MockStore::erased();
    let mode = load_mode(&store, &DispenserConfig::default());
    assert_eq!(mode.index(), 1);
}

#[test]
fn garbage_byte_loads_default_mode() {
    let store = MockStore::holding(0x07);
    let mode = load_mode(&store, &DispenserConfig::default());
    assert_eq!(mode.index(), 1);
}

#[test]
fn valid_byte_is_restored() {
    let store = MockStore::holding(2);
    let mode = load_mode(&store, &DispenserConfig::default());
    assert_eq!(mode, Mode::from_index(2));
}

#[test]
fn advance_persists_and_survives_reload() {
    let config = DispenserConfig::default();
    let mut store = MockStore::erased();
    let mut svc = make_service(load_mode(&store, &config).index());
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    let to = svc.advance_mode(&mut hw, &mut store, &flags, &mut sink);

    assert_eq!(to.index(), 2);
    assert_eq!(store.writes, vec![2]);
    // power cycle
    assert_eq!(load_mode(&store, &config).index(), 2);
    assert_eq!(svc.mode().schedule_period(svc.config()), 2_250);
}

#[test]
fn advance_wraps_to_first_mode() {
    let mut svc = make_service(2);
    let mut store = MockStore::holding(2);
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    svc.advance_mode(&mut hw, &mut store, &flags, &mut sink);

    assert_eq!(svc.mode().index(), 0);
    assert_eq!(store.byte, 0);
    assert_eq!(
        sink.events,
        vec![AppEvent::ModeChanged {
            from: 2,
            to: 0,
            persisted: true
        }]
    );
}

#[test]
fn failed_write_still_switches_mode() {
    let mut svc = make_service(0);
    let mut store = MockStore::holding(0);
    store.fail_writes = true;
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    svc.advance_mode(&mut hw, &mut store, &flags, &mut sink);

    assert_eq!(svc.mode().index(), 1);
    assert_eq!(store.byte, 0);
    assert!(matches!(
        sink.events[0],
        AppEvent::ModeChanged {
            persisted: false,
            ..
        }
    ));
}

#[test]
fn feedback_blinks_once_per_mode_index_then_waits() {
    let mut svc = make_service(0);
    let mut store = MockStore::erased();
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    // 0 -> 1: two pulses
    svc.advance_mode(&mut hw, &mut store, &flags, &mut sink);

    assert_eq!(
        hw.calls,
        vec![
            HwCall::Blink,
            HwCall::DelayMs(500),
            HwCall::Blink,
            HwCall::DelayMs(500),
            HwCall::DelayMs(2_000),
        ]
    );
}

#[test]
fn mode_change_restarts_both_timers() {
    let mut svc = make_service(1);
    let mut store = MockStore::erased();
    let mut hw = MockHardware::new(DARK);
    let flags = EventFlags::new();
    let mut sink = RecordingSink::new();

    hw.script(std::iter::repeat_n(29_000, 100).chain(std::iter::repeat_n(1_000, 10)));
    for _ in 0..110 {
        svc.tick(&mut hw, &flags, &mut sink);
    }
    assert_eq!(svc.main_timer(), 110);
    assert_eq!(svc.light_timer(), 10);

    svc.advance_mode(&mut hw, &mut store, &flags, &mut sink);

    assert_eq!(svc.main_timer(), 0);
    assert_eq!(svc.light_timer(), 0);
}

