// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron manager: owns the store, the action handler, and the single armed
//! deadline.
//!
//! Only the job with the earliest `next_run_at` across all jobs is armed at
//! any time. The delay is clamped to [`MAX_TIMER_DELAY_MS`]; a clamped
//! timer that wakes before its deadline simply re-arms. On fire the manager
//! updates `lastFiredAt` and persists, removes fired `deleteAfterRun`
//! one-shots, publishes a `cron` system event, invokes the optional hook,
//! and re-arms. Persistence failures are logged and never prevent
//! re-arming.

use super::{next_run_at, ActionResponse, CronActionHandler, MAX_TIMER_DELAY_MS};
use chrono::Utc;
use pa_core::{CronJob, CronSchedule, SystemEventKind, SystemEventQueue};
use pa_storage::CronStore;
use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use uuid::Uuid;

/// Hook invoked after each fire (test observation, notifications).
pub type JobFiredHook = Arc<dyn Fn(&CronJob) + Send + Sync>;

struct ArmedTimer {
    job_id: Uuid,
    task: tokio::task::JoinHandle<()>,
}

pub struct CronManager {
    store: CronStore,
    handler: CronActionHandler,
    events: Arc<SystemEventQueue>,
    on_job_fired: Mutex<Option<JobFiredHook>>,
    armed: Mutex<Option<ArmedTimer>>,
    /// Bumped on every disarm; a woken timer from an older generation is
    /// stale and does nothing.
    generation: AtomicU64,
    /// Handle timer tasks use to reach back into the manager.
    weak_self: Weak<CronManager>,
}

impl CronManager {
    pub fn new(store: CronStore, events: Arc<SystemEventQueue>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            handler: CronActionHandler::new(store.clone()),
            store,
            events,
            on_job_fired: Mutex::new(None),
            armed: Mutex::new(None),
            generation: AtomicU64::new(0),
            weak_self: weak.clone(),
        })
    }

    pub fn set_on_job_fired(&self, hook: JobFiredHook) {
        *self.on_job_fired.lock() = Some(hook);
    }

    /// The job the current timer would fire, if one is armed.
    pub fn armed_job(&self) -> Option<Uuid> {
        self.armed.lock().as_ref().map(|a| a.job_id)
    }

    /// Run a cron action and re-arm after successful mutations.
    pub fn handle_action(&self, action: &str, args: &Value) -> ActionResponse {
        let response = self.handler.handle(action, args);
        if response.success && matches!(action, "add" | "update" | "remove") {
            self.rearm_timer();
        }
        response
    }

    /// Re-read the store and arm the earliest deadline. A no-op when no
    /// job has one.
    pub fn rearm_timer(&self) {
        self.disarm();
        self.arm_next();
    }

    /// Disarm the current timer. Safe when nothing is armed.
    pub fn stop(&self) {
        self.disarm();
        tracing::debug!("cron timer disarmed");
    }

    fn disarm(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(armed) = self.armed.lock().take() {
            armed.task.abort();
        }
    }

    fn arm_next(&self) {
        let now = Utc::now();
        let jobs = self.store.load();
        let next = jobs
            .iter()
            .filter_map(|job| next_run_at(job, now).map(|at| (at, job.id)))
            .min();
        let Some((deadline, job_id)) = next else {
            tracing::debug!("no cron job eligible, timer not armed");
            return;
        };

        let raw_delay_ms = (deadline - now).num_milliseconds().max(0);
        let clamped = raw_delay_ms > MAX_TIMER_DELAY_MS;
        let delay = Duration::from_millis(raw_delay_ms.min(MAX_TIMER_DELAY_MS) as u64);
        let generation = self.generation.load(Ordering::SeqCst);

        let Some(manager) = self.weak_self.upgrade() else {
            return;
        };
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if manager.generation.load(Ordering::SeqCst) != generation {
                return; // superseded by a rearm or stop
            }
            manager.armed.lock().take();
            if clamped {
                // deadline is further out; arm the remainder
                manager.arm_next();
            } else {
                manager.fire(job_id);
                manager.arm_next();
            }
        });

        if let Some(previous) = self.armed.lock().replace(ArmedTimer { job_id, task }) {
            previous.task.abort();
        }
        tracing::debug!(job = %job_id, delay_ms = raw_delay_ms, clamped, "cron timer armed");
    }

    fn fire(&self, job_id: Uuid) {
        let mut jobs = self.store.load();
        let Some(index) = jobs.iter().position(|j| j.id == job_id) else {
            tracing::warn!(job = %job_id, "armed job vanished before firing");
            return;
        };

        jobs[index].last_fired_at = Some(Utc::now());
        let job = jobs[index].clone();
        let remove_after = job.delete_after_run
            && matches!(job.schedule, CronSchedule::Oneshot { .. });
        if remove_after {
            jobs.remove(index);
        }
        if let Err(e) = self.store.save(&jobs) {
            tracing::error!(job = %job_id, error = %e, "failed to persist fire, continuing");
        }

        self.events
            .enqueue(SystemEventKind::Cron, job.fire_text());
        let hook = self.on_job_fired.lock().clone();
        if let Some(hook) = hook {
            hook(&job);
        }
        tracing::info!(job = %job.id, label = %job.label, removed = remove_after, "cron job fired");
    }
}

impl Drop for CronManager {
    fn drop(&mut self) {
        if let Some(armed) = self.armed.lock().take() {
            armed.task.abort();
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
