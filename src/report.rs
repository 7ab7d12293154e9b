use crate::hours::{session_hours, WEEKLY_REQUIREMENT};
use crate::models::{User, WeekRecord};
use crate::stats::calculate_summary;
use crate::utils::{display_time, format_hours_minutes, progress_bar};
use anyhow::Result;
use chrono::Local;
use std::fmt::Write;

pub struct Reporter<'a> {
    user: &'a User,
    record: &'a WeekRecord,
    bar_width: usize,
}

impl<'a> Reporter<'a> {
    pub fn new(user: &'a User, record: &'a WeekRecord, bar_width: usize) -> Self {
        Self {
            user,
            record,
            bar_width,
        }
    }

    pub fn report(&self) -> Result<()> {
        print!("{}", self.render()?);
        Ok(())
    }

    pub fn render(&self) -> Result<String> {
        let week = &self.record.week;
        let summary = calculate_summary(week);
        let mut out = String::new();

        writeln!(out, "Weekly Report for {}", self.user.username)?;
        writeln!(out, "====================")?;

        for (day, stats) in week.days().iter().zip(&summary.days) {
            writeln!(
                out,
                "\n{:<10} {}",
                day.name(),
                format_hours_minutes(stats.hours)
            )?;
            for (i, session) in day.sessions.iter().enumerate() {
                writeln!(
                    out,
                    "  #{} {:>5} - {:<5}  {}",
                    i + 1,
                    display_time(&session.check_in),
                    display_time(&session.check_out),
                    format_hours_minutes(session_hours(session))
                )?;
            }
        }

        writeln!(out, "\nWeekly Summary")?;
        writeln!(out, "--------------")?;
        writeln!(
            out,
            "Total Hours:         {}",
            format_hours_minutes(summary.total)
        )?;
        writeln!(
            out,
            "Hours Remaining:     {}",
            format_hours_minutes(summary.remaining)
        )?;
        writeln!(
            out,
            "Complete:            {:.1}% {}",
            summary.percent,
            progress_bar(summary.percent, self.bar_width)
        )?;
        writeln!(out, "Sessions logged:     {}", summary.filled_sessions)?;
        writeln!(
            out,
            "Weekly Requirement:  {} hours",
            WEEKLY_REQUIREMENT
        )?;
        if summary.is_complete() {
            writeln!(out, "Requirement met.")?;
        }
        writeln!(
            out,
            "Last updated:        {}",
            self.record
                .last_updated
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        )?;

        Ok(out)
    }
}
