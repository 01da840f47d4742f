// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only JSONL transcript store.
//!
//! One file per session at `{dataDir}/sessions/{sessionKey}.jsonl`, one
//! `SessionMessage` per line. Writes to a given path are serialized by a
//! per-path lock so concurrent appends can never tear a JSON line. The
//! loader never fails on content: malformed lines are skipped with a
//! warning.

use crate::fsutil::{self, with_suffix};
use crate::StorageError;
use pa_core::SessionMessage;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Transcript persistence with per-path write serialization.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The write lock for one transcript path.
    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        Arc::clone(
            locks
                .entry(path.to_path_buf())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }

    /// Append one message as a JSON line.
    pub fn append_message(&self, path: &Path, msg: &SessionMessage) -> Result<(), StorageError> {
        self.append_messages(path, std::slice::from_ref(msg))
    }

    /// Append a batch of messages; the empty batch is a no-op.
    pub fn append_messages(
        &self,
        path: &Path,
        msgs: &[SessionMessage],
    ) -> Result<(), StorageError> {
        if msgs.is_empty() {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            fsutil::create_dir_private(parent)?;
        }

        let mut lines = String::new();
        for msg in msgs {
            lines.push_str(&serde_json::to_string(msg)?);
            lines.push('\n');
        }

        let lock = self.lock_for(path);
        let _guard = lock.lock();
        let mut file = fsutil::open_append_private(path)?;
        file.write_all(lines.as_bytes())
            .map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }

    /// Load a transcript; a missing file is an empty session.
    pub fn load_transcript(&self, path: &Path) -> Result<Vec<SessionMessage>, StorageError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::io(path, e)),
        };

        let mut messages = Vec::new();
        for (index, line) in raw.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionMessage>(line) {
                Ok(msg) => messages.push(msg),
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        line = index + 1,
                        error = %e,
                        "skipping malformed transcript line"
                    );
                }
            }
        }
        Ok(messages)
    }

    /// Replace a transcript's contents atomically, keeping a `.bak`.
    pub fn rewrite_transcript(
        &self,
        path: &Path,
        msgs: &[SessionMessage],
    ) -> Result<(), StorageError> {
        let mut lines = String::new();
        for msg in msgs {
            lines.push_str(&serde_json::to_string(msg)?);
            lines.push('\n');
        }

        let lock = self.lock_for(path);
        let _guard = lock.lock();
        fsutil::write_atomic(path, &lines)
    }

    /// Path of the backup kept by the last rewrite, if any.
    pub fn backup_path(path: &Path) -> PathBuf {
        with_suffix(path, ".bak")
    }
}

#[cfg(test)]
#[path = "transcript_tests.rs"]
mod tests;
