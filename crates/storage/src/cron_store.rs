// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence for the cron-job store.
//!
//! The whole store is a JSON array at `{dataDir}/cron-jobs.json`, rewritten
//! atomically on every save with the previous file kept as `.bak`. A
//! missing or unreadable store loads as the empty list; the cron manager is
//! the single writer.

use crate::fsutil;
use crate::StorageError;
use pa_core::CronJob;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CronStore {
    path: PathBuf,
}

impl CronStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load all jobs. Missing or corrupt stores degrade to empty.
    pub fn load(&self) -> Vec<CronJob> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read cron store");
                return Vec::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "corrupt cron store, starting empty");
                Vec::new()
            }
        }
    }

    /// Persist all jobs atomically.
    pub fn save(&self, jobs: &[CronJob]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(jobs)?;
        fsutil::write_atomic(&self.path, &json)
    }
}

#[cfg(test)]
#[path = "cron_store_tests.rs"]
mod tests;
