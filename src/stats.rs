use crate::hours::{session_hours, WEEKLY_REQUIREMENT};
use crate::models::{Day, Week};
use chrono::Weekday;

#[derive(Clone, Debug, PartialEq)]
pub struct DayStats {
    pub day: Weekday,
    pub hours: f64,
    pub filled_sessions: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WeekSummary {
    pub days: Vec<DayStats>,
    pub total: f64,
    pub percent: f64,
    pub remaining: f64,
    pub filled_sessions: usize,
}

impl WeekSummary {
    pub fn is_complete(&self) -> bool {
        self.total >= WEEKLY_REQUIREMENT
    }

    pub fn max_day_hours(&self) -> f64 {
        self.days.iter().map(|d| d.hours).fold(0.0, f64::max)
    }
}

pub fn daily_total(day: &Day) -> f64 {
    day.sessions.iter().map(session_hours).sum()
}

pub fn weekly_total(week: &Week) -> f64 {
    week.days().iter().map(daily_total).sum()
}

pub fn percent_complete(total: f64) -> f64 {
    (total / WEEKLY_REQUIREMENT * 100.0).min(100.0)
}

pub fn remaining_hours(total: f64) -> f64 {
    (WEEKLY_REQUIREMENT - total).max(0.0)
}

/// Derives everything the report and the TUI display from the current
/// state. Callers invoke it after each mutation; nothing is cached.
pub fn calculate_summary(week: &Week) -> WeekSummary {
    let days: Vec<DayStats> = week
        .days()
        .iter()
        .map(|day| DayStats {
            day: day.day,
            hours: daily_total(day),
            filled_sessions: day.sessions.iter().filter(|s| s.is_filled()).count(),
        })
        .collect();

    let total: f64 = days.iter().map(|d| d.hours).sum();

    WeekSummary {
        filled_sessions: days.iter().map(|d| d.filled_sessions).sum(),
        days,
        total,
        percent: percent_complete(total),
        remaining: remaining_hours(total),
    }
}
