//! Mode-dependent schedule check.
//!
//! Runs once per tick, after the sample is recorded and before the
//! occupancy FSM steps. It only writes to the [`FsmContext`]; any spray it
//! decides on is queued as a request and applied by the service.
//!
//! ```text
//!   main_timer >= period ?
//!        │ no  → NotDue
//!        │ yes
//!        ├── room dark              → Spray(Schedule)
//!        ├── light on, forgotten    → Spray(ForgottenLight)
//!        └── light on, occupied     → Suppressed
//!   (main_timer = 0 whenever due)
//! ```

use log::{debug, info};

use crate::fsm::context::{FsmContext, Request, Trigger};

/// Result of one schedule check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// Period has not elapsed yet.
    NotDue,
    /// Period elapsed and a spray was queued.
    Spray(Trigger),
    /// Period elapsed while the room was occupied. The cycle restarts anyway.
    Suppressed,
}

/// Evaluate the schedule against the current mode's period.
pub fn evaluate(ctx: &mut FsmContext) -> ScheduleOutcome {
    let period = ctx.schedule_period();
    if ctx.main_timer < period {
        return ScheduleOutcome::NotDue;
    }

    let outcome = if !ctx.light_now_on {
        ScheduleOutcome::Spray(Trigger::Schedule)
    } else if ctx.light_left_on() {
        ScheduleOutcome::Spray(Trigger::ForgottenLight)
    } else {
        ScheduleOutcome::Suppressed
    };

    match outcome {
        ScheduleOutcome::Spray(trigger) => {
            info!("schedule: period {period} elapsed, spraying ({trigger:?})");
            ctx.request(Request::Actuate(trigger));
        }
        _ => debug!(
            "schedule: period {period} elapsed with light on for {} ticks, skipped",
            ctx.light_timer
        ),
    }

    ctx.main_timer = 0;
    outcome
}
