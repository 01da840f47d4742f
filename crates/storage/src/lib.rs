// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pa-storage: on-disk persistence for transcripts, cron jobs, and the
//! daily audit log.
//!
//! All stores share the same discipline: atomic rewrites go through a
//! `.tmp` file and rename, the previous contents are kept as `.bak`,
//! tolerant readers skip malformed lines instead of failing, and sensitive
//! directories/files are created owner-only.

pub mod audit;
pub mod cron_store;
mod fsutil;
pub mod transcript;

pub use audit::{AuditEntry, AuditLog};
pub use cron_store::CronStore;
pub use fsutil::create_dir_private;
pub use transcript::TranscriptStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
