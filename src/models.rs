use crate::errors::{ParseTimeError, WeekError};
use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const TIME_FORMAT: &str = "%H:%M";

pub const DAYS_OF_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Accepts full names and three letter abbreviations, case-insensitive.
pub fn parse_weekday(input: &str) -> Option<Weekday> {
    match input.trim().to_lowercase().as_str() {
        "mon" | "monday" => Some(Weekday::Mon),
        "tue" | "tuesday" => Some(Weekday::Tue),
        "wed" | "wednesday" => Some(Weekday::Wed),
        "thu" | "thursday" => Some(Weekday::Thu),
        "fri" | "friday" => Some(Weekday::Fri),
        "sat" | "saturday" => Some(Weekday::Sat),
        "sun" | "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Wall-clock time with minute precision and no date or zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Lenient "H:M" / "HH:MM" parsing. Anything else, including the partial
    /// text left behind while a user is still typing, is not a time.
    pub fn parse(input: &str) -> Option<Self> {
        NaiveTime::parse_from_str(input.trim(), TIME_FORMAT)
            .ok()
            .map(Self)
    }

    pub fn time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ParseTimeError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SessionField {
    CheckIn,
    CheckOut,
}

impl SessionField {
    pub fn label(&self) -> &'static str {
        match self {
            SessionField::CheckIn => "Check In",
            SessionField::CheckOut => "Check Out",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            SessionField::CheckIn => SessionField::CheckOut,
            SessionField::CheckOut => SessionField::CheckIn,
        }
    }
}

/// One check-in/check-out pair. Fields hold the text as entered, "" when
/// absent; nothing orders or validates them here.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub check_in: String,
    #[serde(default)]
    pub check_out: String,
}

impl Session {
    pub fn check_in_time(&self) -> Option<TimeOfDay> {
        TimeOfDay::parse(&self.check_in)
    }

    pub fn check_out_time(&self) -> Option<TimeOfDay> {
        TimeOfDay::parse(&self.check_out)
    }

    pub fn field(&self, field: SessionField) -> &str {
        match field {
            SessionField::CheckIn => &self.check_in,
            SessionField::CheckOut => &self.check_out,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.check_in_time().is_some() && self.check_out_time().is_some()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Day {
    #[serde(with = "weekday_label")]
    pub day: Weekday,
    pub sessions: Vec<Session>,
}

impl Day {
    pub fn new(day: Weekday) -> Self {
        Self {
            day,
            sessions: vec![Session::default()],
        }
    }

    pub fn name(&self) -> &'static str {
        weekday_name(self.day)
    }

    fn session_mut(&mut self, index: usize) -> Result<&mut Session, WeekError> {
        let (day, len) = (self.name(), self.sessions.len());
        self.sessions
            .get_mut(index)
            .ok_or(WeekError::SessionOutOfRange { day, index, len })
    }
}

mod weekday_label {
    use super::{parse_weekday, weekday_name};
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_name(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let label = String::deserialize(deserializer)?;
        parse_weekday(&label)
            .ok_or_else(|| de::Error::custom(format!("unknown weekday '{}'", label)))
    }
}

/// Seven days, Monday first. Serialized as a bare array of days; anything
/// that is not exactly the canonical seven fails to deserialize.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "Vec<Day>", into = "Vec<Day>")]
pub struct Week {
    days: Vec<Day>,
}

impl Default for Week {
    fn default() -> Self {
        Self {
            days: DAYS_OF_WEEK.iter().map(|&d| Day::new(d)).collect(),
        }
    }
}

impl TryFrom<Vec<Day>> for Week {
    type Error = WeekError;

    fn try_from(days: Vec<Day>) -> Result<Self, Self::Error> {
        if days.len() != DAYS_OF_WEEK.len() {
            return Err(WeekError::Malformed(format!(
                "expected 7 days, found {}",
                days.len()
            )));
        }
        for (day, expected) in days.iter().zip(DAYS_OF_WEEK) {
            if day.day != expected {
                return Err(WeekError::Malformed(format!(
                    "expected {}, found {}",
                    weekday_name(expected),
                    day.name()
                )));
            }
            if day.sessions.is_empty() {
                return Err(WeekError::Malformed(format!("{} has no sessions", day.name())));
            }
        }
        Ok(Self { days })
    }
}

impl From<Week> for Vec<Day> {
    fn from(week: Week) -> Self {
        week.days
    }
}

impl Week {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn days(&self) -> &[Day] {
        &self.days
    }

    pub fn day(&self, day_index: usize) -> Result<&Day, WeekError> {
        self.days
            .get(day_index)
            .ok_or(WeekError::DayOutOfRange(day_index))
    }

    fn day_mut(&mut self, day_index: usize) -> Result<&mut Day, WeekError> {
        self.days
            .get_mut(day_index)
            .ok_or(WeekError::DayOutOfRange(day_index))
    }

    pub fn update_session(
        &mut self,
        day_index: usize,
        session_index: usize,
        field: SessionField,
        value: &str,
    ) -> Result<(), WeekError> {
        let session = self.day_mut(day_index)?.session_mut(session_index)?;
        match field {
            SessionField::CheckIn => session.check_in = value.to_string(),
            SessionField::CheckOut => session.check_out = value.to_string(),
        }
        Ok(())
    }

    /// Appends an empty session and returns its index.
    pub fn add_session(&mut self, day_index: usize) -> Result<usize, WeekError> {
        let day = self.day_mut(day_index)?;
        day.sessions.push(Session::default());
        Ok(day.sessions.len() - 1)
    }

    /// Fails with `LastSession` rather than leaving a day empty.
    pub fn remove_session(
        &mut self,
        day_index: usize,
        session_index: usize,
    ) -> Result<Session, WeekError> {
        let day = self.day_mut(day_index)?;
        day.session_mut(session_index)?;
        if day.sessions.len() == 1 {
            return Err(WeekError::LastSession(day.name()));
        }
        Ok(day.sessions.remove(session_index))
    }

    pub fn clear_session(&mut self, day_index: usize, session_index: usize) -> Result<(), WeekError> {
        *self.day_mut(day_index)?.session_mut(session_index)? = Session::default();
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
        }
    }
}

/// What gets written per user: the whole week, never a partial merge.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WeekRecord {
    pub user_id: Uuid,
    pub week: Week,
    pub last_updated: DateTime<Utc>,
}
