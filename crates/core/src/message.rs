// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Messages exchanged between adapters, the gateway, and the agent.
//!
//! [`AdapterMessage`] is the unit flowing through the gateway queue in both
//! directions; [`SessionMessage`] is one line of a session transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Metadata key adapters use to mirror thread membership.
pub const METADATA_THREAD_ID: &str = "threadId";

/// A message entering or leaving the gateway through an adapter.
///
/// `source` names the adapter; `source_id` is an adapter-defined
/// conversation id that must stay stable for the message's lifetime so a
/// reply resolves to the same conversation. Threaded transports encode
/// thread membership into `source_id` (e.g. `channel--thread`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterMessage {
    pub source: String,
    pub source_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

impl AdapterMessage {
    pub fn new(
        source: impl Into<String>,
        source_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            source_id: source_id.into(),
            text: text.into(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata entry, builder-style.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Thread id mirrored into metadata by threaded adapters, if any.
    pub fn thread_id(&self) -> Option<&str> {
        self.metadata
            .get(METADATA_THREAD_ID)
            .map(String::as_str)
            .filter(|t| !t.is_empty())
    }
}

/// Role of a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
    ToolUse,
    ToolResult,
}

/// One line of a session transcript.
///
/// Sequence ordering is the line index within the transcript file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SessionMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
            tool_name: None,
            error: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
