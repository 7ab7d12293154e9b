use crate::errors::WeekError;
use crate::hours::{session_hours, WEEKLY_REQUIREMENT};
use crate::models::{weekday_name, SessionField};
use crate::stats::WeekSummary;
use crate::storage::Store;
use crate::tracker::Tracker;
use crate::utils::{display_time, format_hours_minutes};
use anyhow::Result;
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::time::Duration as StdDuration;

const MAX_TIME_LEN: usize = 5;

/// Cursor and edit state. The week itself lives in the tracker.
#[derive(Debug)]
pub struct App {
    pub day: usize,
    pub session: usize,
    pub field: SessionField,
    pub editing: Option<String>,
    pub status: Option<String>,
    pub quit: bool,
}

impl Default for App {
    fn default() -> Self {
        Self {
            day: 0,
            session: 0,
            field: SessionField::CheckIn,
            editing: None,
            status: None,
            quit: false,
        }
    }
}

impl App {
    pub fn handle_key<S: Store>(&mut self, tracker: &mut Tracker<S>, code: KeyCode) -> Result<()> {
        if self.editing.is_some() {
            return self.handle_edit_key(tracker, code);
        }

        self.status = None;
        match code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Up | KeyCode::Char('k') => self.move_up(tracker),
            KeyCode::Down | KeyCode::Char('j') => self.move_down(tracker),
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                self.field = self.field.other()
            }
            KeyCode::Enter => {
                let current = tracker
                    .week
                    .day(self.day)?
                    .sessions
                    .get(self.session)
                    .map(|s| s.field(self.field).to_string())
                    .unwrap_or_default();
                self.editing = Some(current);
            }
            KeyCode::Char('a') => {
                let index = tracker.add_session(self.day)?;
                self.session = index;
            }
            KeyCode::Char('d') => {
                let result = tracker.remove_session(self.day, self.session).map(|_| ());
                self.absorb_week_error(result)?;
                self.clamp_session(tracker);
            }
            KeyCode::Char('c') => {
                let result = tracker.clear_session(self.day, self.session);
                self.absorb_week_error(result)?;
            }
            KeyCode::Char('r') => {
                tracker.reset()?;
                self.day = 0;
                self.session = 0;
                self.status = Some("Week reset".to_string());
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_edit_key<S: Store>(&mut self, tracker: &mut Tracker<S>, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char(c) if c.is_ascii_digit() || c == ':' => {
                if let Some(buffer) = self.editing.as_mut() {
                    if buffer.len() < MAX_TIME_LEN {
                        buffer.push(c);
                    }
                }
            }
            KeyCode::Backspace => {
                if let Some(buffer) = self.editing.as_mut() {
                    buffer.pop();
                }
            }
            KeyCode::Esc => self.editing = None,
            KeyCode::Enter => {
                let value = self.editing.take().unwrap_or_default();
                let result = tracker.update_session(self.day, self.session, self.field, &value);
                self.absorb_week_error(result)?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Model rejections (like removing the last session) go to the footer;
    /// anything else, such as a failed write, is a real error.
    fn absorb_week_error(&mut self, result: Result<()>) -> Result<()> {
        match result {
            Err(e) if e.downcast_ref::<WeekError>().is_some() => {
                self.status = Some(e.to_string());
                Ok(())
            }
            other => other,
        }
    }

    fn move_up<S: Store>(&mut self, tracker: &Tracker<S>) {
        if self.session > 0 {
            self.session -= 1;
        } else if self.day > 0 {
            self.day -= 1;
            self.session = tracker.week.days()[self.day].sessions.len() - 1;
        }
    }

    fn move_down<S: Store>(&mut self, tracker: &Tracker<S>) {
        let days = tracker.week.days();
        if self.session + 1 < days[self.day].sessions.len() {
            self.session += 1;
        } else if self.day + 1 < days.len() {
            self.day += 1;
            self.session = 0;
        }
    }

    fn clamp_session<S: Store>(&mut self, tracker: &Tracker<S>) {
        let len = tracker.week.days()[self.day].sessions.len();
        self.session = self.session.min(len - 1);
    }
}

pub fn run_tui<S: Store>(tracker: &mut Tracker<S>) -> Result<()> {
    // setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_loop(&mut terminal, tracker);

    // restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn run_loop<S: Store>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    tracker: &mut Tracker<S>,
) -> Result<()> {
    let mut app = App::default();
    loop {
        let summary = tracker.summary();
        terminal.draw(|f| draw(f, tracker, &summary, &app))?;

        if event::poll(StdDuration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(tracker, key.code)?;
                }
            }
        }

        if app.quit {
            return Ok(());
        }
    }
}

pub fn draw<S: Store>(frame: &mut Frame, tracker: &Tracker<S>, summary: &WeekSummary, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Footer
        ])
        .split(frame.size());

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(chunks[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(7), // Summary
            Constraint::Length(3), // Progress
            Constraint::Min(0),    // Chart
        ])
        .split(body[1]);

    draw_header(frame, chunks[0], tracker);
    draw_days(frame, body[0], tracker, summary, app);
    draw_summary(frame, right[0], summary);
    draw_progress(frame, right[1], summary);
    draw_chart(frame, right[2], summary);
    draw_footer(frame, chunks[2], app);
}

fn draw_header<S: Store>(frame: &mut Frame, area: Rect, tracker: &Tracker<S>) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " wtrack ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(
            tracker.user.username.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::raw(Local::now().format("%Y-%m-%d %H:%M:%S").to_string()),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(header, area);
}

fn draw_days<S: Store>(
    frame: &mut Frame,
    area: Rect,
    tracker: &Tracker<S>,
    summary: &WeekSummary,
    app: &App,
) {
    let mut lines = Vec::new();

    for (day_index, (day, stats)) in tracker.week.days().iter().zip(&summary.days).enumerate() {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {:<10}", day.name()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format_hours_minutes(stats.hours),
                Style::default().fg(Color::Green),
            ),
        ]));

        for (session_index, session) in day.sessions.iter().enumerate() {
            let selected = day_index == app.day && session_index == app.session;
            let mut spans = vec![Span::raw(if selected { "  > " } else { "    " })];
            for field in [SessionField::CheckIn, SessionField::CheckOut] {
                let editing = selected && field == app.field && app.editing.is_some();
                let text = if editing {
                    format!("{:<5}", app.editing.as_deref().unwrap_or_default())
                } else {
                    format!("{:<5}", display_time(session.field(field)))
                };
                let style = if editing {
                    Style::default().fg(Color::Black).bg(Color::Yellow)
                } else if selected && field == app.field {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                spans.push(Span::styled(text, style));
                if field == SessionField::CheckIn {
                    spans.push(Span::raw(" - "));
                }
            }
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                format_hours_minutes(session_hours(session)),
                Style::default().fg(Color::DarkGray),
            ));
            lines.push(Line::from(spans));
        }
    }

    let block = Block::default()
        .title(Span::styled(
            " Daily Check-ins ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_summary(frame: &mut Frame, area: Rect, summary: &WeekSummary) {
    let percent_style = if summary.is_complete() {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let lines = vec![
        Line::raw(format!(
            "  Total Hours:      {}",
            format_hours_minutes(summary.total)
        )),
        Line::raw(format!(
            "  Hours Remaining:  {}",
            format_hours_minutes(summary.remaining)
        )),
        Line::from(vec![
            Span::raw("  Complete:         "),
            Span::styled(format!("{:.1}%", summary.percent), percent_style),
        ]),
        Line::raw(""),
        Line::raw(format!("  Weekly Requirement: {} hours", WEEKLY_REQUIREMENT)),
    ];

    let block = Block::default()
        .title(Span::styled(
            " Weekly Summary ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_progress(frame: &mut Frame, area: Rect, summary: &WeekSummary) {
    let color = if summary.is_complete() {
        Color::Green
    } else {
        Color::Cyan
    };
    let gauge = Gauge::default()
        .block(Block::default().title(" Progress ").borders(Borders::ALL))
        .gauge_style(Style::default().fg(color))
        .percent(summary.percent.clamp(0.0, 100.0).round() as u16)
        .label(format!("{:.1}%", summary.percent));
    frame.render_widget(gauge, area);
}

fn draw_chart(frame: &mut Frame, area: Rect, summary: &WeekSummary) {
    let chart_block = Block::default()
        .title(" Hours per Day ")
        .borders(Borders::ALL);
    let inner_area = chart_block.inner(area);
    frame.render_widget(chart_block, area);

    if inner_area.height < 2 || inner_area.width < 14 {
        return;
    }

    let max_hours = summary.max_day_hours().max(1.0);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7])
        .split(inner_area);

    for (i, stats) in summary.days.iter().enumerate() {
        let col_area = columns[i];

        let bar_label_split = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(col_area);

        let bar_area = bar_label_split[0];
        let label_area = bar_label_split[1];

        // Center the bar horizontally within the column
        let bar_width = 3.min(bar_area.width);
        let bar_x_offset = (bar_area.width - bar_width) / 2;
        let centered_bar_area = Rect::new(
            bar_area.x + bar_x_offset,
            bar_area.y,
            bar_width,
            bar_area.height,
        );

        let label: String = weekday_name(stats.day).chars().take(3).collect();
        frame.render_widget(
            Paragraph::new(label).alignment(Alignment::Center),
            label_area,
        );

        if centered_bar_area.height > 0 {
            let bar_height = ((stats.hours / max_hours) * f64::from(centered_bar_area.height))
                .round() as u16;
            let bar_height = bar_height.min(centered_bar_area.height);

            let bar_chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(centered_bar_area.height - bar_height),
                    Constraint::Length(bar_height),
                ])
                .split(centered_bar_area);

            if bar_height > 0 {
                frame.render_widget(Block::default().bg(Color::Green), bar_chunks[1]);
            }
        }
    }
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    let text = match (&app.status, &app.editing) {
        (_, Some(_)) => format!(
            "{}: type HH:MM | Enter to save | Esc to cancel",
            app.field.label()
        ),
        (Some(status), None) => status.clone(),
        (None, None) => {
            "q quit | arrows move | Enter edit | a add | d remove | c clear | r reset".to_string()
        }
    };
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn setup() -> (App, Tracker<MemoryStore>) {
        let tracker = Tracker::login(MemoryStore::default(), "ada", None).unwrap();
        (App::default(), tracker)
    }

    fn press(app: &mut App, tracker: &mut Tracker<MemoryStore>, keys: &[KeyCode]) {
        for &key in keys {
            app.handle_key(tracker, key).unwrap();
        }
    }

    fn type_text(app: &mut App, tracker: &mut Tracker<MemoryStore>, text: &str) {
        for c in text.chars() {
            app.handle_key(tracker, KeyCode::Char(c)).unwrap();
        }
    }

    #[test]
    fn test_edit_and_commit_time() {
        let (mut app, mut tracker) = setup();
        press(&mut app, &mut tracker, &[KeyCode::Enter]);
        type_text(&mut app, &mut tracker, "09:00x");
        press(&mut app, &mut tracker, &[KeyCode::Enter, KeyCode::Tab, KeyCode::Enter]);
        type_text(&mut app, &mut tracker, "13:000");
        press(&mut app, &mut tracker, &[KeyCode::Enter]);

        let session = &tracker.week.days()[0].sessions[0];
        assert_eq!(session.check_in, "09:00");
        assert_eq!(session.check_out, "13:00");
        assert_eq!(tracker.summary().total, 4.0);
        assert_eq!(
            tracker.store.load_week(&tracker.user.id).unwrap(),
            Some(tracker.week.clone())
        );
    }

    #[test]
    fn test_escape_discards_edit() {
        let (mut app, mut tracker) = setup();
        press(&mut app, &mut tracker, &[KeyCode::Enter]);
        type_text(&mut app, &mut tracker, "10");
        press(&mut app, &mut tracker, &[KeyCode::Backspace, KeyCode::Esc]);
        assert!(app.editing.is_none());
        assert_eq!(tracker.week.days()[0].sessions[0].check_in, "");
    }

    #[test]
    fn test_navigation_crosses_days() {
        let (mut app, mut tracker) = setup();
        press(&mut app, &mut tracker, &[KeyCode::Char('a')]);
        assert_eq!((app.day, app.session), (0, 1));

        press(&mut app, &mut tracker, &[KeyCode::Down]);
        assert_eq!((app.day, app.session), (1, 0));
        press(&mut app, &mut tracker, &[KeyCode::Up]);
        assert_eq!((app.day, app.session), (0, 1));
        press(&mut app, &mut tracker, &[KeyCode::Up, KeyCode::Up]);
        assert_eq!((app.day, app.session), (0, 0));

        for _ in 0..20 {
            press(&mut app, &mut tracker, &[KeyCode::Char('j')]);
        }
        assert_eq!((app.day, app.session), (6, 0));
    }

    #[test]
    fn test_remove_last_session_shows_status() {
        let (mut app, mut tracker) = setup();
        press(&mut app, &mut tracker, &[KeyCode::Char('d')]);
        assert_eq!(app.status.as_deref(), Some("Monday must keep at least one session"));
        assert_eq!(tracker.week.days()[0].sessions.len(), 1);

        press(&mut app, &mut tracker, &[KeyCode::Char('a'), KeyCode::Char('d')]);
        assert_eq!(tracker.week.days()[0].sessions.len(), 1);
        assert_eq!(app.session, 0);
        assert!(app.status.is_none());
    }

    #[test]
    fn test_reset_and_quit() {
        let (mut app, mut tracker) = setup();
        press(&mut app, &mut tracker, &[KeyCode::Down, KeyCode::Char('a'), KeyCode::Char('r')]);
        assert_eq!(tracker.week, crate::models::Week::new());
        assert_eq!((app.day, app.session), (0, 0));
        press(&mut app, &mut tracker, &[KeyCode::Char('q')]);
        assert!(app.quit);
    }
}
