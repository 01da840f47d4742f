// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron job model: schedules and persisted job records.
//!
//! Jobs are persisted as a JSON array at `{dataDir}/cron-jobs.json` (see
//! `pa-storage`); next-fire computation and the single-deadline timer live
//! in `pa-engine`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// When a job should fire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CronSchedule {
    /// Standard 5-field cron expression, evaluated in UTC.
    Cron { expression: String },
    /// A single absolute instant. Past instants are inert.
    Oneshot { iso: DateTime<Utc> },
    /// Relative interval from the last fire (or creation).
    #[serde(rename_all = "camelCase")]
    Interval { every_ms: u64 },
}

/// What a fire delivers: the text becomes the `cron` system event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronPayload {
    pub text: String,
}

impl CronPayload {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// A persisted scheduled job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub id: Uuid,
    pub label: String,
    pub schedule: CronSchedule,
    pub payload: CronPayload,
    pub created_at: DateTime<Utc>,
    pub last_fired_at: Option<DateTime<Utc>>,
    pub enabled: bool,
    /// One-shot jobs with this flag are removed from the store after firing.
    #[serde(default, skip_serializing_if = "is_false")]
    pub delete_after_run: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl CronJob {
    /// Build a new enabled job with a fresh id, created now.
    pub fn new(label: impl Into<String>, schedule: CronSchedule, payload: CronPayload) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
            schedule,
            payload,
            created_at: Utc::now(),
            last_fired_at: None,
            enabled: true,
            delete_after_run: false,
        }
    }

    /// The text published as the `cron` system event on fire.
    pub fn fire_text(&self) -> &str {
        if self.payload.text.is_empty() {
            &self.label
        } else {
            &self.payload.text
        }
    }
}

#[cfg(test)]
#[path = "cron_job_tests.rs"]
mod tests;
