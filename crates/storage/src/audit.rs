// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daily audit log.
//!
//! One JSONL file per day at `{workspace}/daily/{YYYY-MM-DD}.jsonl`, one
//! entry per completed gateway turn. Malformed lines are skipped on read.

use crate::fsutil;
use crate::StorageError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;

/// One audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub session_key: String,
    pub source: String,
    pub ok: bool,
}

impl AuditEntry {
    pub fn new(session_key: impl Into<String>, source: impl Into<String>, ok: bool) -> Self {
        Self {
            timestamp: Utc::now(),
            session_key: session_key.into(),
            source: source.into(),
            ok,
        }
    }
}

/// Appender/reader for the daily audit files.
#[derive(Debug, Clone)]
pub struct AuditLog {
    workspace: PathBuf,
}

impl AuditLog {
    pub fn new(workspace: impl Into<PathBuf>) -> Self {
        Self {
            workspace: workspace.into(),
        }
    }

    fn day_path(&self, date: NaiveDate) -> PathBuf {
        self.workspace
            .join("daily")
            .join(format!("{}.jsonl", date.format("%Y-%m-%d")))
    }

    /// Append an entry to the file for its own date.
    pub fn append(&self, entry: &AuditEntry) -> Result<(), StorageError> {
        let path = self.day_path(entry.timestamp.date_naive());
        if let Some(parent) = path.parent() {
            fsutil::create_dir_private(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = fsutil::open_append_private(&path)?;
        writeln!(file, "{line}").map_err(|e| StorageError::io(&path, e))
    }

    /// Read one day's entries, skipping malformed lines.
    pub fn read_day(&self, date: NaiveDate) -> Result<Vec<AuditEntry>, StorageError> {
        let path = self.day_path(date);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(&path, e)),
        };

        let mut entries = Vec::new();
        for line in raw.lines().filter(|l| !l.trim().is_empty()) {
            match serde_json::from_str(line) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping malformed audit line");
                }
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
