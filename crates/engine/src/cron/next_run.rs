// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Next-fire computation for cron jobs.

use chrono::{DateTime, Duration, Utc};
use pa_core::{CronJob, CronSchedule};
use std::str::FromStr;

/// Longest delay a single timer may be armed for; longer deadlines re-arm
/// when the clamped delay expires.
pub const MAX_TIMER_DELAY_MS: i64 = i32::MAX as i64;

/// When `job` should next fire, or `None` if it never will.
///
/// - disabled jobs never fire;
/// - cron expressions are 5-field, evaluated in UTC, strictly after `now`;
///   parse errors silently disable the job;
/// - a one-shot fires at its instant only while that instant is in the
///   future;
/// - an interval is always `(lastFiredAt ?? createdAt) + everyMs` — callers
///   treat a deadline already in the past as "fire immediately".
pub fn next_run_at(job: &CronJob, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    if !job.enabled {
        return None;
    }
    match &job.schedule {
        CronSchedule::Cron { expression } => {
            // the `cron` crate wants a seconds field; the stored form is
            // standard 5-field
            let schedule = match cron::Schedule::from_str(&format!("0 {expression}")) {
                Ok(schedule) => schedule,
                Err(e) => {
                    tracing::warn!(job = %job.id, %expression, error = %e, "unparseable cron expression");
                    return None;
                }
            };
            schedule.after(&now).next()
        }
        CronSchedule::Oneshot { iso } => (*iso > now).then_some(*iso),
        CronSchedule::Interval { every_ms } => {
            let base = job.last_fired_at.unwrap_or(job.created_at);
            Some(base + Duration::milliseconds(*every_ms as i64))
        }
    }
}

#[cfg(test)]
#[path = "next_run_tests.rs"]
mod tests;
