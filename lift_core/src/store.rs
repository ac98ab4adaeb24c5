//! Per-profile persistence with file locking.
//!
//! Each profile keeps three JSON snapshots under
//! `data_dir/profiles/<name>/`: the workout logs, the profile stats
//! and the personal records. The engine always writes the full updated
//! collection after a mutation; saves are atomic (temp file + rename)
//! and loads degrade to defaults when a file is missing or corrupted.

use crate::error::{Error, Result};
use crate::session::SessionSnapshot;
use crate::types::{PersonalRecord, Quest, UserProfileStats, WorkoutLog};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{de::DeserializeOwned, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

// ============================================================================
// Clock
// ============================================================================

/// Injectable time source so engine behavior is deterministic in tests
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A settable clock for deterministic tests. Clones share the same
/// instant, so a handle kept outside the engine can move time forward.
#[derive(Clone)]
pub struct FixedClock(Arc<Mutex<DateTime<Utc>>>);

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Arc::new(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().expect("clock mutex poisoned") = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock mutex poisoned")
    }
}

// ============================================================================
// Profile Store
// ============================================================================

/// File-backed store for one profile's data
pub struct ProfileStore {
    dir: PathBuf,
}

impl ProfileStore {
    /// Create a store rooted at `data_dir/profiles/<profile>`
    pub fn new(data_dir: &Path, profile: &str) -> Self {
        Self {
            dir: data_dir.join("profiles").join(profile),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn logs_path(&self) -> PathBuf {
        self.dir.join("logs.json")
    }

    fn stats_path(&self) -> PathBuf {
        self.dir.join("stats.json")
    }

    fn records_path(&self) -> PathBuf {
        self.dir.join("prs.json")
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join("session.json")
    }

    fn quests_path(&self) -> PathBuf {
        self.dir.join("quests.json")
    }

    pub fn load_logs(&self) -> Result<Vec<WorkoutLog>> {
        load_snapshot(&self.logs_path())
    }

    pub fn save_logs(&self, logs: &[WorkoutLog]) -> Result<()> {
        save_snapshot(&self.logs_path(), &logs)
    }

    pub fn load_stats(&self) -> Result<UserProfileStats> {
        load_snapshot(&self.stats_path())
    }

    pub fn save_stats(&self, stats: &UserProfileStats) -> Result<()> {
        save_snapshot(&self.stats_path(), stats)
    }

    pub fn load_records(&self) -> Result<Vec<PersonalRecord>> {
        load_snapshot(&self.records_path())
    }

    pub fn save_records(&self, records: &[PersonalRecord]) -> Result<()> {
        save_snapshot(&self.records_path(), &records)
    }

    pub fn load_session(&self) -> Result<Option<SessionSnapshot>> {
        load_snapshot(&self.session_path())
    }

    pub fn save_session(&self, session: &Option<SessionSnapshot>) -> Result<()> {
        save_snapshot(&self.session_path(), session)
    }

    pub fn load_quests(&self) -> Result<Vec<Quest>> {
        load_snapshot(&self.quests_path())
    }

    pub fn save_quests(&self, quests: &[Quest]) -> Result<()> {
        save_snapshot(&self.quests_path(), &quests)
    }
}

/// Load a JSON snapshot with a shared lock.
///
/// Returns the default value when the file doesn't exist. A file that
/// cannot be read or parsed logs a warning and also returns the
/// default; a stale derived value self-corrects on the next
/// recalculation pass.
fn load_snapshot<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    if !path.exists() {
        tracing::debug!("No snapshot at {:?}, using default", path);
        return Ok(T::default());
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            tracing::warn!("Unable to open {:?}: {}. Using default.", path, e);
            return Ok(T::default());
        }
    };

    if let Err(e) = file.lock_shared() {
        tracing::warn!("Unable to lock {:?}: {}. Using default.", path, e);
        return Ok(T::default());
    }

    let mut contents = String::new();
    let mut reader = std::io::BufReader::new(&file);
    if let Err(e) = reader.read_to_string(&mut contents) {
        let _ = file.unlock();
        tracing::warn!("Failed to read {:?}: {}. Using default.", path, e);
        return Ok(T::default());
    }

    file.unlock()?;

    match serde_json::from_str::<T>(&contents) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!("Failed to parse {:?}: {}. Using default.", path, e);
            Ok(T::default())
        }
    }
}

/// Save a JSON snapshot atomically:
/// 1. Write to a temp file in the same directory
/// 2. Sync to disk
/// 3. Rename over the original
fn save_snapshot<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "snapshot path missing parent")
    })?)?;

    // Exclusive lock on the temp file to serialize concurrent writers
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        let contents = serde_json::to_string(value)?;
        writer.write_all(contents.as_bytes())?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;

    temp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::debug!("Saved snapshot to {:?}", path);
    Ok(())
}
