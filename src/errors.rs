//! Domain errors. Plumbing (I/O, JSON, CLI) goes through `anyhow`; these are
//! the failures callers are expected to match on.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeekError {
    #[error("day index {0} is out of range (expected 0..=6)")]
    DayOutOfRange(usize),

    #[error("{day} has no session #{n} ({len} sessions)", n = .index + 1)]
    SessionOutOfRange {
        day: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{0} must keep at least one session")]
    LastSession(&'static str),

    #[error("malformed week: {0}")]
    Malformed(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Username is required")]
    UsernameRequired,

    #[error("Email is required for sign up")]
    EmailRequired,

    #[error("Please enter a valid email")]
    InvalidEmail,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid time '{0}', expected HH:MM")]
pub struct ParseTimeError(pub String);
