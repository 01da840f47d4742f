// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of background and yielded shell executions.
//!
//! Sessions are keyed by UUID and live until a sweep finds them older than
//! [`PROCESS_SESSION_TTL`]. The registry is an injectable service owned by
//! the daemon orchestrator; readers take snapshots, mutations of unknown
//! ids are no-ops, and `sweep` never waits for the lock.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use uuid::Uuid;

/// Sessions older than this are evicted by `sweep`.
pub const PROCESS_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

/// Snapshot of one tracked execution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSession {
    pub id: Uuid,
    pub pid: u32,
    pub command: String,
    pub output: String,
    pub exit_code: Option<i32>,
    pub started_at: DateTime<Utc>,
    pub exited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct ProcessRegistry {
    sessions: Mutex<HashMap<Uuid, ProcessSession>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a freshly spawned process; returns its session id.
    pub fn add(&self, command: &str, pid: u32) -> Uuid {
        let id = Uuid::new_v4();
        let session = ProcessSession {
            id,
            pid,
            command: command.to_string(),
            output: String::new(),
            exit_code: None,
            started_at: Utc::now(),
            exited_at: None,
        };
        self.sessions.lock().insert(id, session);
        id
    }

    /// Append captured stdout/stderr to a session's accumulating output.
    pub fn append_output(&self, id: Uuid, chunk: &str) {
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.output.push_str(chunk);
        }
    }

    /// Record a session's exit. Unknown ids are ignored.
    pub fn mark_exited(&self, id: Uuid, exit_code: Option<i32>) {
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.exit_code = exit_code;
            session.exited_at = Some(Utc::now());
        }
    }

    pub fn get(&self, id: Uuid) -> Option<ProcessSession> {
        self.sessions.lock().get(&id).cloned()
    }

    /// Snapshot all sessions, oldest first.
    pub fn list(&self) -> Vec<ProcessSession> {
        let mut sessions: Vec<_> = self.sessions.lock().values().cloned().collect();
        sessions.sort_by_key(|s| s.started_at);
        sessions
    }

    /// Evict sessions older than the TTL.
    ///
    /// Invoked opportunistically before new executions; if the lock is
    /// contended the sweep is skipped rather than waited for.
    pub fn sweep(&self) {
        let Some(mut sessions) = self.sessions.try_lock() else {
            return;
        };
        let cutoff = Utc::now()
            - chrono::Duration::from_std(PROCESS_SESSION_TTL)
                .unwrap_or_else(|_| chrono::Duration::seconds(1800));
        let before = sessions.len();
        sessions.retain(|_, s| s.started_at > cutoff);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "swept expired process sessions");
        }
    }

    pub fn clear(&self) {
        self.sessions.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }

    #[cfg(test)]
    fn backdate(&self, id: Uuid, by: Duration) {
        if let Some(session) = self.sessions.lock().get_mut(&id) {
            session.started_at -= chrono::Duration::from_std(by)
                .unwrap_or_else(|_| chrono::Duration::zero());
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
