//! Acquisition pipeline: cache check, remote fetch, cache write
//!
//! Each call is sequential. A fresh cache entry short-circuits the network;
//! otherwise the resolver is asked and its result is written back once.
//! A remote failure is never masked by returning a stale cache entry.

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{DatasetKey, DatasetRecord, StudentReport};
use crate::services::local_store::LocalStore;
use crate::services::record_extractor;
use crate::services::remote_resolver::RemoteSourceResolver;
use attendance_common::catalog::{self, ModuleDescriptor};
use attendance_common::config::TomlConfig;
use std::path::Path;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Default cache freshness window
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

/// Orchestrates the local store and the remote resolver
pub struct AcquisitionPipeline {
    store: LocalStore,
    resolver: RemoteSourceResolver,
    max_age: Duration,
}

impl AcquisitionPipeline {
    pub fn new(store: LocalStore, resolver: RemoteSourceResolver) -> Self {
        Self {
            store,
            resolver,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    /// Override the freshness window (zero disables the age check)
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Build the production pipeline from configuration
    pub fn from_config(config: &TomlConfig, cache_dir: &Path) -> AttendanceResult<Self> {
        let store = LocalStore::open(cache_dir)?;
        let resolver = RemoteSourceResolver::from_config(&config.remote)?;
        Ok(Self::new(store, resolver).with_max_age(config.cache.max_age()))
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Dataset for `key`, from cache when fresh, otherwise from the remote
    pub async fn get_dataset(
        &self,
        key: &DatasetKey,
        force_refresh: bool,
        cancel: Option<&CancellationToken>,
    ) -> AttendanceResult<Vec<DatasetRecord>> {
        let id = self.store.path_for(key);

        if !force_refresh && self.store.is_fresh(&id, self.max_age).await {
            info!(dataset = %key, entry = %id, "Using cached local file");
            return self.store.read(&id).await;
        }

        info!(dataset = %key, force_refresh, "Downloading attendance dataset");
        let records = self.resolver.fetch(key, cancel).await?;

        if let Err(e) = self.store.write(&id, &records).await {
            warn!(
                dataset = %key,
                error = %e,
                "Failed to save dataset to local cache, returning downloaded data"
            );
        }

        Ok(records)
    }

    /// Fetch the dataset and build one student's report.
    ///
    /// A student missing from the dataset is `StudentNotFound`, distinct
    /// from transport and parse failures.
    pub async fn lookup_student(
        &self,
        key: &DatasetKey,
        student_id: &str,
        force_refresh: bool,
        cancel: Option<&CancellationToken>,
    ) -> AttendanceResult<StudentReport> {
        if student_id.trim().is_empty() {
            return Err(AttendanceError::Validation(
                "student id is required".to_string(),
            ));
        }

        let records = self.get_dataset(key, force_refresh, cancel).await?;
        record_extractor::build_report(&records, student_id).ok_or_else(|| {
            AttendanceError::StudentNotFound {
                student_id: student_id.trim().to_string(),
            }
        })
    }

    /// Modules offered in an academic year
    pub fn available_modules(&self, academic_year: &str) -> &'static [ModuleDescriptor] {
        catalog::modules_for(academic_year)
    }

    /// Remove every cached attendance dataset
    pub async fn clear_cache(&self) -> AttendanceResult<usize> {
        let deleted = self.store.clear_attendance().await?;
        info!(deleted, "Cleared attendance cache");
        Ok(deleted)
    }
}
