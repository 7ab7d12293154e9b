use crate::models::{User, Week, WeekRecord};
use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const USERS_FILE_NAME: &str = "users.json";
const CURRENT_USER_FILE_NAME: &str = "current_user.json";
const WEEKS_DIR_NAME: &str = "weeks";

/// The three records the tracker persists, each addressable on its own:
/// the user registry, the current-user marker and one week per user.
/// Every save is a whole-record overwrite.
pub trait Store {
    fn load_users(&self) -> Result<Vec<User>>;
    fn save_users(&self, users: &[User]) -> Result<()>;

    fn current_user(&self) -> Result<Option<User>>;
    fn set_current_user(&self, user: &User) -> Result<()>;
    fn clear_current_user(&self) -> Result<()>;

    fn load_record(&self, user_id: &Uuid) -> Result<Option<WeekRecord>>;
    fn save_record(&self, record: &WeekRecord) -> Result<()>;

    fn load_week(&self, user_id: &Uuid) -> Result<Option<Week>> {
        Ok(self.load_record(user_id)?.map(|r| r.week))
    }

    fn save_week(&self, user_id: &Uuid, week: &Week) -> Result<()> {
        self.save_record(&WeekRecord {
            user_id: *user_id,
            week: week.clone(),
            last_updated: Utc::now(),
        })
    }
}

/// JSON files under one data directory (`~/.wtrack` by default).
#[derive(Clone, Debug)]
pub struct Storage {
    base_dir: PathBuf,
}

impl Storage {
    pub fn get_base_dir() -> Result<PathBuf> {
        let mut path = dirs::home_dir().ok_or_else(|| anyhow!("Could not find home directory"))?;
        path.push(".wtrack");
        if !path.exists() {
            fs::create_dir_all(&path)?;
        }
        Ok(path)
    }

    pub fn from_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(base_dir.join(WEEKS_DIR_NAME))?;
        Ok(Self { base_dir })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn week_path(&self, user_id: &Uuid) -> PathBuf {
        self.base_dir
            .join(WEEKS_DIR_NAME)
            .join(format!("{}.json", user_id))
    }

    /// Missing file reads as `None`. So does a file that no longer parses:
    /// corrupt state is moved aside to `<name>.json.bak`, logged, and treated
    /// as "no data".
    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        match serde_json::from_str(&data) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                let backup = path.with_extension("json.bak");
                tracing::warn!(
                    "ignoring corrupt {} ({e}), moved to {}",
                    path.display(),
                    backup.display()
                );
                fs::rename(path, &backup)
                    .with_context(|| format!("Failed to move aside {}", path.display()))?;
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        let data = serde_json::to_string_pretty(value)?;
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, &data)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        tracing::debug!("saved {}", path.display());
        Ok(())
    }
}

impl Store for Storage {
    fn load_users(&self) -> Result<Vec<User>> {
        Ok(self
            .read_json(&self.base_dir.join(USERS_FILE_NAME))?
            .unwrap_or_default())
    }

    fn save_users(&self, users: &[User]) -> Result<()> {
        self.write_json(&self.base_dir.join(USERS_FILE_NAME), users)
    }

    fn current_user(&self) -> Result<Option<User>> {
        self.read_json(&self.base_dir.join(CURRENT_USER_FILE_NAME))
    }

    fn set_current_user(&self, user: &User) -> Result<()> {
        self.write_json(&self.base_dir.join(CURRENT_USER_FILE_NAME), user)
    }

    fn clear_current_user(&self) -> Result<()> {
        let path = self.base_dir.join(CURRENT_USER_FILE_NAME);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn load_record(&self, user_id: &Uuid) -> Result<Option<WeekRecord>> {
        let record: Option<WeekRecord> = self.read_json(&self.week_path(user_id))?;
        match record {
            Some(r) if r.user_id != *user_id => {
                tracing::warn!("week file for {} belongs to {}, ignoring", user_id, r.user_id);
                Ok(None)
            }
            other => {
                tracing::debug!("loaded week for {}: {}", user_id, other.is_some());
                Ok(other)
            }
        }
    }

    fn save_record(&self, record: &WeekRecord) -> Result<()> {
        self.write_json(&self.week_path(&record.user_id), record)
    }
}
