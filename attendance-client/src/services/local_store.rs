//! Local dataset cache
//!
//! One JSON file per dataset under the cache folder, named
//! `Y{year}_{moduleId}_attendance.json`, holding the record array verbatim.
//!
//! Freshness is judged from the file's modification time. That conflates
//! "written by this client" with "touched by any process"; it is sound only
//! while this client is the single writer of the cache folder.

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{DatasetKey, DatasetRecord};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Suffix shared by every cache entry file name
pub const ATTENDANCE_SUFFIX: &str = "_attendance.json";

/// Cache entry identifier (the file name inside the cache folder)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageId(String);

impl StorageId {
    pub fn for_key(key: &DatasetKey) -> Self {
        Self(key.file_name())
    }

    pub fn from_file_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id names an attendance dataset file
    pub fn is_attendance_file(&self) -> bool {
        self.0.contains(ATTENDANCE_SUFFIX)
    }
}

impl fmt::Display for StorageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// File-backed dataset cache
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root` (created lazily on first write)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create a store and make sure its folder exists
    pub fn open(root: impl Into<PathBuf>) -> AttendanceResult<Self> {
        let store = Self::new(root);
        attendance_common::config::ensure_cache_dir(&store.root)?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic, injective storage id for a dataset key
    pub fn path_for(&self, key: &DatasetKey) -> StorageId {
        StorageId::for_key(key)
    }

    /// Absolute file path of a cache entry
    pub fn file_path(&self, id: &StorageId) -> PathBuf {
        self.root.join(id.as_str())
    }

    /// Whether the entry exists and is no older than `max_age`.
    ///
    /// A zero `max_age` disables the age check. Missing or unreadable
    /// entries are never fresh.
    pub async fn is_fresh(&self, id: &StorageId, max_age: Duration) -> bool {
        self.is_fresh_at(id, max_age, SystemTime::now()).await
    }

    /// [`LocalStore::is_fresh`] evaluated at an explicit instant
    pub async fn is_fresh_at(&self, id: &StorageId, max_age: Duration, now: SystemTime) -> bool {
        let modified = match self.modified(id).await {
            Ok(Some(modified)) => modified,
            Ok(None) => return false,
            Err(e) => {
                warn!(entry = %id, error = %e, "Could not stat cache entry");
                return false;
            }
        };

        if max_age.is_zero() {
            return true;
        }

        let age = attendance_common::time::age_between(modified, now);
        if age > max_age {
            debug!(entry = %id, age_secs = age.as_secs(), "Cache entry is outdated");
            return false;
        }
        true
    }

    /// Last write time of an entry, if present
    pub async fn stored_at(&self, id: &StorageId) -> Option<DateTime<Utc>> {
        match self.modified(id).await {
            Ok(Some(modified)) => Some(attendance_common::time::system_time_to_utc(modified)),
            _ => None,
        }
    }

    async fn modified(&self, id: &StorageId) -> std::io::Result<Option<SystemTime>> {
        match tokio::fs::metadata(self.file_path(id)).await {
            Ok(meta) if meta.is_file() => meta.modified().map(Some),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Read a cached dataset
    pub async fn read(&self, id: &StorageId) -> AttendanceResult<Vec<DatasetRecord>> {
        let bytes = match tokio::fs::read(self.file_path(id)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(AttendanceError::NotFound(id.to_string()))
            }
            Err(e) => return Err(AttendanceError::Io(e)),
        };

        let records: Vec<DatasetRecord> =
            serde_json::from_slice(&bytes).map_err(|e| AttendanceError::CorruptData {
                id: id.to_string(),
                reason: e.to_string(),
            })?;

        debug!(entry = %id, records = records.len(), "Read cached dataset");
        Ok(records)
    }

    /// Replace a cached dataset.
    ///
    /// Content goes to a uniquely named sibling temp file that is then
    /// renamed over the entry, so readers see either the old or the new file
    /// in full. Temp names never carry [`ATTENDANCE_SUFFIX`], so clearing the
    /// cache cannot remove a write in progress.
    pub async fn write(&self, id: &StorageId, records: &[DatasetRecord]) -> AttendanceResult<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let json = serde_json::to_vec(records).map_err(|e| {
            AttendanceError::Io(std::io::Error::new(ErrorKind::InvalidData, e))
        })?;

        let root = self.root.clone();
        let target = self.file_path(id);
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut temp = tempfile::Builder::new()
                .prefix(".pending-")
                .suffix(".tmp")
                .tempfile_in(&root)?;
            temp.write_all(&json)?;
            temp.as_file().sync_all()?;
            temp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| AttendanceError::Io(std::io::Error::new(ErrorKind::Other, e)))??;

        info!(entry = %id, records = records.len(), "Saved dataset to local cache");
        Ok(())
    }

    /// Delete every entry matching `predicate`.
    ///
    /// Individual delete failures are logged and skipped; the return value
    /// counts successful deletions only.
    pub async fn clear<F>(&self, predicate: F) -> AttendanceResult<usize>
    where
        F: Fn(&StorageId) -> bool,
    {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut deleted = 0;
        while let Some(entry) = entries.next_entry().await? {
            let id = StorageId::from_file_name(entry.file_name().to_string_lossy().into_owned());
            if !predicate(&id) {
                continue;
            }

            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => {
                    info!(entry = %id, "Deleted cache entry");
                    deleted += 1;
                }
                Err(e) => {
                    warn!(entry = %id, error = %e, "Failed to delete cache entry, continuing");
                }
            }
        }

        Ok(deleted)
    }

    /// Delete all cached attendance datasets
    pub async fn clear_attendance(&self) -> AttendanceResult<usize> {
        self.clear(StorageId::is_attendance_file).await
    }

    /// Cached dataset entries, sorted by name
    pub async fn list(&self) -> AttendanceResult<Vec<StorageId>> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut ids = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(ATTENDANCE_SUFFIX) && !name.starts_with('.') {
                ids.push(StorageId::from_file_name(name));
            }
        }
        ids.sort();
        Ok(ids)
    }
}
