use chrono::{DateTime, TimeDelta, Utc};
use shared::domain::EventState;

/// Time the event timer has been running, excluding paused intervals.
///
/// `start_time` is shifted backwards whenever the timer resumes, so the result is always
/// derived from the recorded timestamps rather than accumulated separately.
pub fn elapsed(state: &EventState, now: DateTime<Utc>) -> TimeDelta {
    let Some(start) = state.start_time else {
        return TimeDelta::zero();
    };
    let end = if state.timer_running {
        now
    } else {
        state.pause_time.unwrap_or(start)
    };
    (end - start).max(TimeDelta::zero())
}

#[cfg(test)]
#[path = "tests/elapsed_tests.rs"]
mod tests;
