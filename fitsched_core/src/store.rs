//! Schedule persistence behind an injected store capability.
//!
//! The core never assumes a storage engine. It needs exactly two things
//! from its store: the user's workout-preferences blob, and one atomic
//! commit that replaces the user's schedule assignments and preferences
//! together. Two implementations are provided:
//! - [`MemoryStore`] for tests and in-process embedding
//! - [`JsonStateStore`], a single-file JSON store written via an
//!   exclusive-locked temp file and atomic rename, so a commit either
//!   lands completely or not at all

use crate::{Error, Result, ScheduleAssignment, ScheduleRecord};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use uuid::Uuid;

/// Store capability injected into the scheduling wrapper
pub trait ScheduleStore {
    /// The user's workout-preferences blob; `Value::Null` for unknown users
    fn workout_preferences(&self, user_id: Uuid) -> Result<Value>;

    /// Atomically replace the user's schedule
    ///
    /// Deletes all prior assignment records for the user, inserts one
    /// record per supplied assignment, and stores the given preferences
    /// blob. All-or-nothing: on error no part of the replacement is
    /// visible afterwards.
    fn replace_schedule(
        &mut self,
        user_id: Uuid,
        assignments: &[ScheduleAssignment],
        preferences: &Value,
    ) -> Result<()>;
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Clone, Debug, Default)]
struct MemoryUser {
    preferences: Value,
    schedule: Vec<ScheduleRecord>,
}

/// In-memory schedule store
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, MemoryUser>,
    fail_next: bool,
}

impl MemoryStore {
    /// Seed a user's preferences blob
    pub fn put_workout_preferences(&mut self, user_id: Uuid, preferences: Value) {
        self.users.entry(user_id).or_default().preferences = preferences;
    }

    /// Stored assignment records for a user
    pub fn assignments_for(&self, user_id: Uuid) -> Vec<ScheduleRecord> {
        self.users
            .get(&user_id)
            .map(|u| u.schedule.clone())
            .unwrap_or_default()
    }

    /// Make the next commit fail without touching state; lets callers
    /// exercise their error-propagation paths
    pub fn fail_next_commit(&mut self) {
        self.fail_next = true;
    }
}

impl ScheduleStore for MemoryStore {
    fn workout_preferences(&self, user_id: Uuid) -> Result<Value> {
        Ok(self
            .users
            .get(&user_id)
            .map(|u| u.preferences.clone())
            .unwrap_or(Value::Null))
    }

    fn replace_schedule(
        &mut self,
        user_id: Uuid,
        assignments: &[ScheduleAssignment],
        preferences: &Value,
    ) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(Error::Store("injected commit failure".into()));
        }

        let user = self.users.entry(user_id).or_default();
        user.schedule = assignments
            .iter()
            .map(|a| ScheduleRecord {
                user_id,
                template_id: a.template_id.clone(),
                day: a.day,
            })
            .collect();
        user.preferences = preferences.clone();
        Ok(())
    }
}

// ============================================================================
// Single-file JSON store
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct UserEntry {
    #[serde(default)]
    workout_preferences: Value,
    #[serde(default)]
    schedule: Vec<ScheduleRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    users: HashMap<Uuid, UserEntry>,
}

/// File name used inside a data directory
const STATE_FILE_NAME: &str = "schedule_state.json";

/// Schedule store backed by a single JSON state file
///
/// Every commit rewrites the whole file through a locked temp file and an
/// atomic rename, so readers never observe a half-replaced schedule.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Open a store at an explicit state-file path
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Open the store inside a data directory (see [`crate::Config`])
    pub fn open_in(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STATE_FILE_NAME),
        }
    }

    /// Load the state file with shared locking
    ///
    /// A missing or unreadable file yields empty state; a corrupted file is
    /// logged and also yields empty state rather than failing scheduling.
    fn load_state(&self) -> StateFile {
        if !self.path.exists() {
            return StateFile::default();
        }

        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open schedule state {:?}: {}. Using empty state.",
                    self.path,
                    e
                );
                return StateFile::default();
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock schedule state {:?}: {}. Using empty state.",
                self.path,
                e
            );
            return StateFile::default();
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        let _ = file.unlock();

        if let Err(e) = read {
            tracing::warn!(
                "Failed to read schedule state {:?}: {}. Using empty state.",
                self.path,
                e
            );
            return StateFile::default();
        }

        match serde_json::from_str::<StateFile>(&contents) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "Failed to parse schedule state {:?}: {}. Using empty state.",
                    self.path,
                    e
                );
                StateFile::default()
            }
        }
    }

    /// Write the state file atomically
    ///
    /// Writes to an exclusive-locked temp file in the same directory, syncs
    /// it, then renames it over the original. On any failure the previous
    /// file remains untouched, which is what makes `replace_schedule`
    /// all-or-nothing.
    fn save_state(&self, state: &StateFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "state path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(state)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved schedule state to {:?}", self.path);
        Ok(())
    }
}

impl ScheduleStore for JsonStateStore {
    fn workout_preferences(&self, user_id: Uuid) -> Result<Value> {
        let state = self.load_state();
        Ok(state
            .users
            .get(&user_id)
            .map(|u| u.workout_preferences.clone())
            .unwrap_or(Value::Null))
    }

    fn replace_schedule(
        &mut self,
        user_id: Uuid,
        assignments: &[ScheduleAssignment],
        preferences: &Value,
    ) -> Result<()> {
        let mut state = self.load_state();

        let user = state.users.entry(user_id).or_default();
        user.schedule = assignments
            .iter()
            .map(|a| ScheduleRecord {
                user_id,
                template_id: a.template_id.clone(),
                day: a.day,
            })
            .collect();
        user.workout_preferences = preferences.clone();

        self.save_state(&state)?;

        tracing::debug!(
            "Replaced schedule for user {}: {} assignments",
            user_id,
            assignments.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WeekDay;
    use serde_json::json;

    fn assignment(id: &str, day: WeekDay) -> ScheduleAssignment {
        ScheduleAssignment {
            template_id: id.into(),
            day,
        }
    }

    #[test]
    fn test_memory_store_replace_is_full_replace() {
        let mut store = MemoryStore::default();
        let user = Uuid::new_v4();

        store
            .replace_schedule(
                user,
                &[
                    assignment("t1", WeekDay::Monday),
                    assignment("t2", WeekDay::Wednesday),
                ],
                &json!({}),
            )
            .unwrap();
        store
            .replace_schedule(user, &[assignment("t3", WeekDay::Friday)], &json!({}))
            .unwrap();

        let records = store.assignments_for(user);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].template_id, "t3");
        assert_eq!(records[0].user_id, user);
    }

    #[test]
    fn test_json_store_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::open_in(temp_dir.path());
        let user = Uuid::new_v4();

        store
            .replace_schedule(
                user,
                &[assignment("t1", WeekDay::Tuesday)],
                &json!({ "schedule_preferences": { "start_day": "Tuesday" } }),
            )
            .unwrap();

        // Re-open from disk
        let reopened = JsonStateStore::open_in(temp_dir.path());
        let prefs = reopened.workout_preferences(user).unwrap();
        assert_eq!(prefs["schedule_preferences"]["start_day"], json!("Tuesday"));

        let state = reopened.load_state();
        assert_eq!(state.users[&user].schedule.len(), 1);
        assert_eq!(state.users[&user].schedule[0].day, WeekDay::Tuesday);
    }

    #[test]
    fn test_json_store_unknown_user_yields_null() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = JsonStateStore::open_in(temp_dir.path());

        let prefs = store.workout_preferences(Uuid::new_v4()).unwrap();
        assert_eq!(prefs, Value::Null);
    }

    #[test]
    fn test_json_store_tolerates_corrupted_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(STATE_FILE_NAME);
        std::fs::write(&path, "{ invalid json }").unwrap();

        let store = JsonStateStore::open(&path);
        let prefs = store.workout_preferences(Uuid::new_v4()).unwrap();
        assert_eq!(prefs, Value::Null);
    }

    #[test]
    fn test_json_store_commit_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JsonStateStore::open_in(temp_dir.path());

        store
            .replace_schedule(
                Uuid::new_v4(),
                &[assignment("t1", WeekDay::Monday)],
                &json!({}),
            )
            .unwrap();

        let extras: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name() != STATE_FILE_NAME)
            .collect();
        assert!(
            extras.is_empty(),
            "Expected only {}, found extras: {:?}",
            STATE_FILE_NAME,
            extras
        );
    }
}
