//! Concrete state handler functions and table builder.
//!
//! Each state is defined by plain `fn` pointers: no closures, no dynamic
//! dispatch, no heap.
//!
//! ```text
//!  LIGHT_OFF ──[score < threshold]──▶ LIGHT_ON   (blink, light_timer = 1)
//!      ▲                                  │
//!      │                                  │ [score >= threshold]
//!      └──────────────────────────────────┘
//!        on_exit: long visit + gap elapsed → spray, main_timer = 0
//!                 otherwise               → declined blink
//! ```

use super::context::{BlinkKind, FsmContext, Request, Trigger};
use super::{StateDescriptor, StateId};
use log::{debug, info};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static state table.  Called once at startup.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: LightOff
        StateDescriptor {
            id: StateId::LightOff,
            name: "LightOff",
            on_enter: None,
            on_exit: None,
            on_update: light_off_update,
        },
        // Index 1: LightOn
        StateDescriptor {
            id: StateId::LightOn,
            name: "LightOn",
            on_enter: Some(light_on_enter),
            on_exit: Some(light_on_exit),
            on_update: light_on_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  LIGHT_OFF state
// ═══════════════════════════════════════════════════════════════════════════

fn light_off_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.light_now_on {
        return Some(StateId::LightOn);
    }
    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  LIGHT_ON state
// ═══════════════════════════════════════════════════════════════════════════

fn light_on_enter(ctx: &mut FsmContext) {
    ctx.request(Request::Blink(BlinkKind::LightOn));
    ctx.bump_light_timer();
    info!(
        "LIGHT_ON: score {} below threshold {}",
        ctx.last_score.0,
        ctx.threshold.value()
    );
}

fn light_on_update(ctx: &mut FsmContext) -> Option<StateId> {
    if ctx.light_now_on {
        ctx.bump_light_timer();
        return None;
    }
    Some(StateId::LightOff)
}

fn light_on_exit(ctx: &mut FsmContext) {
    let dwell = ctx.light_timer;
    ctx.last_dwell = dwell;

    if dwell > ctx.config.min_light_ticks && ctx.main_timer > ctx.config.min_gap_ticks {
        info!(
            "LIGHT_OFF: visit of {} ticks, {} ticks since last spray, spraying",
            dwell, ctx.main_timer
        );
        ctx.request(Request::Actuate(Trigger::LightOff));
        ctx.main_timer = 0;
    } else {
        debug!(
            "LIGHT_OFF: visit of {} ticks, {} ticks since last spray, declined",
            dwell, ctx.main_timer
        );
        ctx.request(Request::Blink(BlinkKind::Declined));
    }

    ctx.light_timer = 0;
}
