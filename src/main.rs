mod auth;
mod config;
mod errors;
mod hours;
mod models;
mod report;
mod stats;
mod storage;
mod tracker;
mod tui;
mod utils;

use anyhow::{anyhow, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use config::Config;
use fd_lock::RwLock;
use models::{parse_weekday, SessionField, TimeOfDay, WeekRecord};
use report::Reporter;
use std::fs::OpenOptions;
use std::path::PathBuf;
use storage::{Storage, Store};
use tracing_subscriber::EnvFilter;
use tracker::Tracker;
use utils::{display_time, format_hours_minutes};

#[derive(Parser)]
#[command(name = "wtrack")]
#[command(about = "Track weekly school hours inside the 09:00-18:00 window", long_about = None)]
struct Cli {
    /// Data directory (defaults to ~/.wtrack)
    #[arg(long, global = true, env = "WTRACK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, or sign up when an email is given and the name is new
    Login {
        username: String,
        /// Email address (sign up)
        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the current user
    Logout,
    /// Show the current user
    Whoami,
    /// Set a check-in or check-out time ("" clears it)
    Set {
        /// Day name (mon, tuesday, ...) or number 1-7
        #[arg(value_parser = parse_day)]
        day: usize,
        /// Session number, starting at 1
        #[arg(value_parser = parse_position)]
        session: usize,
        #[arg(value_enum)]
        field: SessionField,
        /// Time as HH:MM
        value: String,
    },
    /// Append an empty session to a day
    AddSession {
        #[arg(value_parser = parse_day)]
        day: usize,
    },
    /// Remove a session (a day always keeps at least one)
    RemoveSession {
        #[arg(value_parser = parse_day)]
        day: usize,
        #[arg(value_parser = parse_position)]
        session: usize,
    },
    /// Clear both times of a session
    Clear {
        #[arg(value_parser = parse_day)]
        day: usize,
        #[arg(value_parser = parse_position)]
        session: usize,
    },
    /// Start the week over
    Reset,
    /// Print the weekly report
    Report,
    /// Open the interactive editor
    Tui,
}

fn parse_day(input: &str) -> Result<usize, String> {
    if let Ok(n) = input.parse::<usize>() {
        return match n {
            1..=7 => Ok(n - 1),
            _ => Err(format!("day number must be 1-7, got {}", n)),
        };
    }
    let weekday = parse_weekday(input).ok_or_else(|| format!("unknown day '{}'", input))?;
    Ok(weekday.num_days_from_monday() as usize)
}

fn parse_position(input: &str) -> Result<usize, String> {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("session must be a number starting at 1, got '{}'", input)),
    }
}

/// Empty clears the field; anything else must be a real time and is stored
/// zero-padded.
fn normalize_time(value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(String::new());
    }
    Ok(value.parse::<TimeOfDay>()?.to_string())
}

fn init_logging(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .compact()
        .init();
}

fn require_tracker(storage: Storage) -> Result<Tracker<Storage>> {
    Tracker::resume(storage)?
        .ok_or_else(|| anyhow!("Not logged in. Run `wtrack login <username>` first."))
}

fn print_day(tracker: &Tracker<Storage>, day: usize) -> Result<()> {
    let day = tracker.week.day(day)?;
    println!("{}:", day.name());
    for (i, session) in day.sessions.iter().enumerate() {
        println!(
            "  #{} {} - {}  {}",
            i + 1,
            display_time(&session.check_in),
            display_time(&session.check_out),
            format_hours_minutes(hours::session_hours(session))
        );
    }
    print_week_total(tracker);
    Ok(())
}

fn print_week_total(tracker: &Tracker<Storage>) {
    let summary = tracker.summary();
    println!(
        "Week total: {} ({:.1}%)",
        format_hours_minutes(summary.total),
        summary.percent
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let base_dir = match cli.data_dir {
        Some(dir) => dir,
        None => Storage::get_base_dir()?,
    };
    let config = config::load_config(&base_dir)?;
    init_logging(&config);
    let storage = Storage::from_dir(base_dir)?;

    match cli.command {
        Commands::Login { username, email } => {
            let existed = auth::find_user(&storage, username.trim())?.is_some();
            let tracker = Tracker::login(storage, &username, email.as_deref())?;
            if existed {
                println!("Welcome back, {}!", tracker.user.username);
            } else {
                println!("Created account for {}.", tracker.user.username);
            }
            print_week_total(&tracker);
        }
        Commands::Logout => match Tracker::resume(storage)? {
            Some(tracker) => {
                let username = tracker.user.username.clone();
                tracker.logout()?;
                println!("Logged out {}.", username);
            }
            None => println!("Not logged in."),
        },
        Commands::Whoami => match storage.current_user()? {
            Some(user) if user.email.is_empty() => println!("{}", user.username),
            Some(user) => println!("{} <{}>", user.username, user.email),
            None => println!("Not logged in."),
        },
        Commands::Set {
            day,
            session,
            field,
            value,
        } => {
            let mut tracker = require_tracker(storage)?;
            let value = normalize_time(&value)?;
            tracker.update_session(day, session, field, &value)?;
            print_day(&tracker, day)?;
        }
        Commands::AddSession { day } => {
            let mut tracker = require_tracker(storage)?;
            tracker.add_session(day)?;
            print_day(&tracker, day)?;
        }
        Commands::RemoveSession { day, session } => {
            let mut tracker = require_tracker(storage)?;
            tracker.remove_session(day, session)?;
            print_day(&tracker, day)?;
        }
        Commands::Clear { day, session } => {
            let mut tracker = require_tracker(storage)?;
            tracker.clear_session(day, session)?;
            print_day(&tracker, day)?;
        }
        Commands::Reset => {
            let mut tracker = require_tracker(storage)?;
            tracker.reset()?;
            println!("Week reset for {}.", tracker.user.username);
        }
        Commands::Report => {
            let tracker = require_tracker(storage)?;
            let record = match tracker.store.load_record(&tracker.user.id)? {
                Some(record) => record,
                None => WeekRecord {
                    user_id: tracker.user.id,
                    week: tracker.week.clone(),
                    last_updated: Utc::now(),
                },
            };
            Reporter::new(&tracker.user, &record, config.progress_bar_width).report()?;
        }
        Commands::Tui => {
            let lock_path = storage.base_dir().join("wtrack.lock");
            let lock_file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(lock_path)?;

            let mut lock = RwLock::new(lock_file);
            let _guard = lock.try_write().map_err(|_| {
                anyhow!("Another wtrack editor is already open. Please close it before starting a new one.")
            })?;

            let mut tracker = require_tracker(storage)?;
            tui::run_tui(&mut tracker)?;

            let summary = tracker.summary();
            println!(
                "Saved. {} of {} logged this week.",
                format_hours_minutes(summary.total),
                format_hours_minutes(hours::WEEKLY_REQUIREMENT)
            );
        }
    }

    Ok(())
}
