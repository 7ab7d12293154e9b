use crate::auth;
use crate::models::{Session, SessionField, User, Week};
use crate::stats::{calculate_summary, WeekSummary};
use crate::storage::Store;
use anyhow::Result;

/// The active session: one logged-in user editing their week. Every
/// mutation is written through to the store before returning.
pub struct Tracker<S: Store> {
    pub store: S,
    pub user: User,
    pub week: Week,
}

impl<S: Store> Tracker<S> {
    /// Loads the user's week, or starts (and saves) a fresh one when nothing
    /// usable is stored.
    pub fn open(store: S, user: User) -> Result<Self> {
        let week = match store.load_week(&user.id)? {
            Some(week) => week,
            None => {
                tracing::info!("starting a fresh week for {}", user.username);
                let week = Week::new();
                store.save_week(&user.id, &week)?;
                week
            }
        };
        Ok(Self { store, user, week })
    }

    /// Reopens whoever the current-user marker names, if anyone.
    pub fn resume(store: S) -> Result<Option<Self>> {
        match store.current_user()? {
            Some(user) => Ok(Some(Self::open(store, user)?)),
            None => Ok(None),
        }
    }

    pub fn login(store: S, username: &str, email: Option<&str>) -> Result<Self> {
        let user = auth::login(&store, username, email)?;
        Self::open(store, user)
    }

    /// Clears the marker and drops the in-memory week without saving it
    /// again; what was last persisted stays authoritative.
    pub fn logout(self) -> Result<S> {
        auth::logout(&self.store)?;
        Ok(self.store)
    }

    pub fn summary(&self) -> WeekSummary {
        calculate_summary(&self.week)
    }

    pub fn update_session(
        &mut self,
        day_index: usize,
        session_index: usize,
        field: SessionField,
        value: &str,
    ) -> Result<()> {
        self.week
            .update_session(day_index, session_index, field, value)?;
        self.persist()
    }

    pub fn add_session(&mut self, day_index: usize) -> Result<usize> {
        let index = self.week.add_session(day_index)?;
        self.persist()?;
        Ok(index)
    }

    pub fn remove_session(&mut self, day_index: usize, session_index: usize) -> Result<Session> {
        let removed = self.week.remove_session(day_index, session_index)?;
        self.persist()?;
        Ok(removed)
    }

    pub fn clear_session(&mut self, day_index: usize, session_index: usize) -> Result<()> {
        self.week.clear_session(day_index, session_index)?;
        self.persist()
    }

    pub fn reset(&mut self) -> Result<()> {
        self.week.reset();
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        self.store.save_week(&self.user.id, &self.week)
    }
}
