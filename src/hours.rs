//! Valid-hours calculation: only time inside the 09:00-18:00 window counts.

use crate::models::{Session, TimeOfDay};
use chrono::NaiveTime;

pub const WINDOW_START_HOUR: u32 = 9;
pub const WINDOW_END_HOUR: u32 = 18;
pub const WEEKLY_REQUIREMENT: f64 = 15.0;

const MINUTES_PER_HOUR: f64 = 60.0;

/// Hours between `check_in` and `check_out` that fall inside the valid
/// window, rounded to two decimals (half away from zero). Absent endpoints,
/// inverted pairs and spans entirely outside the window give 0. Sessions do
/// not wrap past midnight.
pub fn compute_valid_hours(check_in: Option<TimeOfDay>, check_out: Option<TimeOfDay>) -> f64 {
    let (Some(check_in), Some(check_out)) = (check_in, check_out) else {
        return 0.0;
    };
    let (Some(window_start), Some(window_end)) = (
        NaiveTime::from_hms_opt(WINDOW_START_HOUR, 0, 0),
        NaiveTime::from_hms_opt(WINDOW_END_HOUR, 0, 0),
    ) else {
        return 0.0;
    };

    let effective_start = check_in.time().max(window_start);
    let effective_end = check_out.time().min(window_end);
    if effective_end <= effective_start {
        return 0.0;
    }

    let minutes = (effective_end - effective_start).num_minutes();
    round_hundredths(minutes as f64 / MINUTES_PER_HOUR)
}

/// Malformed or partial text counts as absent.
pub fn session_hours(session: &Session) -> f64 {
    compute_valid_hours(session.check_in_time(), session.check_out_time())
}

pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
