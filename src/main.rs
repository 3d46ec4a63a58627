//! Spritz Firmware: Main Entry Point
//!
//! Hexagonal architecture with interrupt-flagged, run-to-completion wake
//! cycles and automatic light sleep in between.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter          LogEventSink      NvsModeStore       │
//! │  (Light+LED+Spray+Delay)  (EventSink)       (ModeStorePort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            DispenserService (pure logic)               │    │
//! │  │  Scheduler · Occupancy FSM · Mode                      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Tick timer · Button ISRs ──▶ EventFlags ──▶ main loop         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

// ── Imports ───────────────────────────────────────────────────
use anyhow::Result;
use log::{error, info, warn};

use spritz::adapters::hardware::HardwareAdapter;
use spritz::adapters::log_sink::LogEventSink;
use spritz::adapters::nvs::NvsModeStore;
use spritz::adapters::time::{SystemDelay, uptime_ms};
use spritz::app::mode::load_mode;
use spritz::app::service::DispenserService;
use spritz::config::DispenserConfig;
use spritz::drivers::button::ButtonIsr;
use spritz::drivers::indicator::Indicator;
use spritz::drivers::sprayer::Sprayer;
use spritz::drivers::{hw_init, hw_timer};
use spritz::error::Error;
use spritz::events::{Event, EventFlags};
use spritz::pins;
use spritz::power;
use spritz::sensors::light::LightSensor;

// ── Interrupt-shared state ────────────────────────────────────

static INPUTS: EventFlags = EventFlags::new();
static SPRAY_BUTTON: ButtonIsr =
    ButtonIsr::new(pins::BUTTON_SPRAY_GPIO, Event::SprayRequested, &INPUTS, 50);
static MODE_BUTTON: ButtonIsr =
    ButtonIsr::new(pins::BUTTON_MODE_GPIO, Event::ModeRequested, &INPUTS, 50);

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  Spritz v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = DispenserConfig::default();
    let config = match config.validate() {
        Ok(()) => config,
        Err(e) => {
            warn!("{}, using defaults", Error::from(e));
            DispenserConfig::default()
        }
    };
    info!(
        "tick {:.1}s, periods {:?} ticks",
        config.tick_secs(),
        config.schedule_periods
    );

    // ── 3. Initialise hardware peripherals ────────────────────
    if let Err(e) = hw_init::init_peripherals() {
        // Without GPIO there is no motor, LED or sensor; halt and let the
        // brown-out / watchdog reset us.
        error!("{}, halting", Error::from(e));
        #[allow(clippy::empty_loop)]
        loop {}
    }

    let mut hw = HardwareAdapter::new(
        LightSensor::new(pins::LED_ANODE_GPIO, pins::LED_CATHODE_GPIO, &config),
        Indicator::new(pins::LED_ANODE_GPIO, pins::LED_CATHODE_GPIO, config.blink_pulse_us),
        Sprayer::new(pins::MOTOR_GPIO),
        SystemDelay::new(),
    );
    hw.all_off();

    let mut log_sink = LogEventSink::new();

    // ── 4. Mode store ─────────────────────────────────────────
    let mut store = match NvsModeStore::new() {
        Ok(s) => s,
        Err(e) => {
            warn!("{}, mode will not persist this session", Error::from(e));
            NvsModeStore::unavailable()
        }
    };
    let mode = load_mode(&store, &config);

    // ── 5. Calibrate + start ──────────────────────────────────
    let threshold = DispenserService::calibrate(&mut hw, &config, &mut log_sink);
    let mut app = DispenserService::new(config.clone(), mode, threshold);
    app.start(&mut log_sink);
    app.boot_test_spray(&mut hw, &INPUTS, &mut log_sink);

    // ── 6. Wake sources ───────────────────────────────────────
    SPRAY_BUTTON.configure(config.button_debounce_ms);
    MODE_BUTTON.configure(config.button_debounce_ms);
    if let Err(e) = hw_init::init_isr_service(&SPRAY_BUTTON, &MODE_BUTTON) {
        error!("{}, continuing without buttons", Error::from(e));
    }
    hw_timer::start_tick_timer(config.tick_period_ms, &INPUTS).map_err(Error::from)?;
    if let Err(e) = power::enable_light_sleep() {
        warn!("{}, running without light sleep", Error::from(e));
    }

    info!("System ready after {} ms. Entering event loop.", uptime_ms());

    // ── 7. Event loop ─────────────────────────────────────────
    loop {
        power::wait_for_event(&INPUTS);
        let pending = INPUTS.take();
        app.service(pending, &mut hw, &mut store, &INPUTS, &mut log_sink);
    }
}
