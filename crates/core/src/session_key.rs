// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-key derivation.
//!
//! A session key is the durable conversation identifier: `source`,
//! `source_id`, and an optional thread id joined by `--`. Keys are purely
//! derived and never persisted as identifiers of their own; the transcript
//! file for a session lives at `{dataDir}/sessions/{key}.jsonl`.

/// Separator joining session-key parts.
pub const SESSION_KEY_SEPARATOR: &str = "--";

/// Derive the session key for a message.
///
/// An empty thread id is treated as absent.
pub fn resolve_session_key(source: &str, source_id: &str, thread_id: Option<&str>) -> String {
    match thread_id.filter(|t| !t.is_empty()) {
        Some(thread) => format!("{source}{SESSION_KEY_SEPARATOR}{source_id}{SESSION_KEY_SEPARATOR}{thread}"),
        None => format!("{source}{SESSION_KEY_SEPARATOR}{source_id}"),
    }
}

#[cfg(test)]
#[path = "session_key_tests.rs"]
mod tests;
