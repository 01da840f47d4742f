// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded system-event queue feeding heartbeats.
//!
//! Producers are the executor (background exits), the cron manager (fires),
//! and anything that wants the next heartbeat to mention something. The
//! heartbeat scheduler is the only consumer. The queue is a fixed-capacity
//! FIFO: on overflow the oldest event is discarded, and no operation blocks.
//!
//! The queue is an injectable service owned by the daemon orchestrator;
//! callers hold an `Arc<SystemEventQueue>` handle. Tests construct their own
//! instance.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of events held before the oldest is dropped.
pub const SYSTEM_EVENT_CAPACITY: usize = 20;

/// Kind of a system event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SystemEventKind {
    System,
    Exec,
    Cron,
}

/// A small typed record held in the queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemEvent {
    #[serde(rename = "type")]
    pub kind: SystemEventKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Process-wide bounded FIFO of system events.
#[derive(Debug, Default)]
pub struct SystemEventQueue {
    inner: Mutex<VecDeque<SystemEvent>>,
}

impl SystemEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event, timestamped now. Drops the oldest entry when full.
    pub fn enqueue(&self, kind: SystemEventKind, text: impl Into<String>) {
        let event = SystemEvent {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        };
        let mut queue = self.inner.lock();
        if queue.len() >= SYSTEM_EVENT_CAPACITY {
            let dropped = queue.pop_front();
            if let Some(dropped) = dropped {
                tracing::debug!(kind = ?dropped.kind, "system-event queue full, dropping oldest");
            }
        }
        queue.push_back(event);
    }

    /// Snapshot the pending events without consuming them.
    pub fn peek(&self) -> Vec<SystemEvent> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Take and clear all pending events.
    pub fn drain(&self) -> Vec<SystemEvent> {
        self.inner.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
#[path = "system_event_tests.rs"]
mod tests;
