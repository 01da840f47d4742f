// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron action handler: the single entry point the agent (and CLI) use to
//! manage jobs.
//!
//! Every action returns `{success, message, data?}`; validation failures
//! and unknown ids are reported there, never as errors.

use pa_core::{CronJob, CronPayload, CronSchedule};
use pa_storage::CronStore;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

/// Response envelope for cron actions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ActionResponse {
    fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Handles `add` / `list` / `update` / `remove` against the store.
pub struct CronActionHandler {
    store: CronStore,
}

impl CronActionHandler {
    pub fn new(store: CronStore) -> Self {
        Self { store }
    }

    pub fn handle(&self, action: &str, args: &Value) -> ActionResponse {
        match action {
            "add" => self.add(args),
            "list" => self.list(),
            "update" => self.update(args),
            "remove" => self.remove(args),
            other => ActionResponse::fail(format!("unknown action: {other}")),
        }
    }

    fn add(&self, args: &Value) -> ActionResponse {
        let Some(label) = args.get("label").and_then(Value::as_str) else {
            return ActionResponse::fail("add requires a label");
        };
        let schedule: CronSchedule = match args.get("schedule") {
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(schedule) => schedule,
                Err(e) => return ActionResponse::fail(format!("invalid schedule: {e}")),
            },
            None => return ActionResponse::fail("add requires a schedule"),
        };
        let payload: CronPayload = match args.get("payload") {
            Some(raw) => match serde_json::from_value(raw.clone()) {
                Ok(payload) => payload,
                Err(e) => return ActionResponse::fail(format!("invalid payload: {e}")),
            },
            None => return ActionResponse::fail("add requires a payload"),
        };

        let mut job = CronJob::new(label, schedule, payload);
        if let Some(delete_after_run) = args.get("deleteAfterRun").and_then(Value::as_bool) {
            job.delete_after_run = delete_after_run;
        }

        let mut jobs = self.store.load();
        jobs.push(job.clone());
        if let Err(e) = self.store.save(&jobs) {
            return ActionResponse::fail(format!("failed to persist job: {e}"));
        }
        tracing::info!(job = %job.id, label = %job.label, "cron job added");
        ActionResponse::ok(
            format!("added job {}", job.id),
            serde_json::to_value(&job).ok(),
        )
    }

    fn list(&self) -> ActionResponse {
        let jobs = self.store.load();
        ActionResponse::ok(
            format!("{} job(s)", jobs.len()),
            serde_json::to_value(&jobs).ok(),
        )
    }

    fn update(&self, args: &Value) -> ActionResponse {
        let Some(id) = parse_id(args) else {
            return ActionResponse::fail("update requires an id");
        };
        let mut jobs = self.store.load();
        let Some(job) = jobs.iter_mut().find(|j| j.id == id) else {
            return ActionResponse::fail(format!("no job with id {id}"));
        };

        if let Some(label) = args.get("label").and_then(Value::as_str) {
            job.label = label.to_string();
        }
        if let Some(raw) = args.get("schedule") {
            match serde_json::from_value(raw.clone()) {
                Ok(schedule) => job.schedule = schedule,
                Err(e) => return ActionResponse::fail(format!("invalid schedule: {e}")),
            }
        }
        if let Some(raw) = args.get("payload") {
            match serde_json::from_value(raw.clone()) {
                Ok(payload) => job.payload = payload,
                Err(e) => return ActionResponse::fail(format!("invalid payload: {e}")),
            }
        }
        if let Some(enabled) = args.get("enabled").and_then(Value::as_bool) {
            job.enabled = enabled;
        }

        let updated = job.clone();
        if let Err(e) = self.store.save(&jobs) {
            return ActionResponse::fail(format!("failed to persist job: {e}"));
        }
        tracing::info!(job = %id, "cron job updated");
        ActionResponse::ok(
            format!("updated job {id}"),
            serde_json::to_value(&updated).ok(),
        )
    }

    fn remove(&self, args: &Value) -> ActionResponse {
        let Some(id) = parse_id(args) else {
            return ActionResponse::fail("remove requires an id");
        };
        let mut jobs = self.store.load();
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        if jobs.len() == before {
            return ActionResponse::fail(format!("no job with id {id}"));
        }
        if let Err(e) = self.store.save(&jobs) {
            return ActionResponse::fail(format!("failed to persist removal: {e}"));
        }
        tracing::info!(job = %id, "cron job removed");
        ActionResponse::ok(format!("removed job {id}"), None)
    }
}

fn parse_id(args: &Value) -> Option<Uuid> {
    args.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
