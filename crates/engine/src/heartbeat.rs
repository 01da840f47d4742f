// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat scheduler.
//!
//! On every interval tick inside the active hours the scheduler drains the
//! system-event queue, picks a prompt (pending `exec` events first, then
//! `cron`, then the standard timestamped prompt), and hands a synthetic
//! `source = "heartbeat"` message to its callback — normally the gateway's
//! `enqueue`. The agent answers a heartbeat it has nothing to say to with
//! the [`HEARTBEAT_OK`] sentinel, which the gateway detects and suppresses;
//! any other reply is delivered to the `deliver_to` destination the
//! synthetic message carries in its `source_id`.

use chrono::{DateTime, Timelike, Utc};
use pa_core::config::HeartbeatConfig;
use pa_core::{AdapterMessage, SystemEvent, SystemEventKind, SystemEventQueue};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Source name of synthetic heartbeat messages.
pub const HEARTBEAT_SOURCE: &str = "heartbeat";

/// Reserved reply meaning "no action warranted, send nothing".
pub const HEARTBEAT_OK: &str = "HEARTBEAT_OK";

/// Sentinel detection: case-insensitive, whitespace-tolerant, nothing else
/// on the line (`/^\s*HEARTBEAT_OK\s*$/i`).
pub fn is_heartbeat_ok(text: &str) -> bool {
    text.trim().eq_ignore_ascii_case(HEARTBEAT_OK)
}

/// Parse `"H1-H2"` active hours. `0-24` means all day.
pub fn parse_active_hours(s: &str) -> Option<(u32, u32)> {
    let (start, end) = s.trim().split_once('-')?;
    let start: u32 = start.trim().parse().ok()?;
    let end: u32 = end.trim().parse().ok()?;
    if start > 23 || end > 24 {
        return None;
    }
    Some((start, end))
}

/// Is `hour` inside `[start, end)`? Windows may wrap midnight
/// (`22-6` means 22:00 to 06:00).
pub fn hour_in_window(hour: u32, window: (u32, u32)) -> bool {
    let (start, end) = window;
    if start == end {
        return false;
    }
    if start < end {
        hour >= start && hour < end
    } else {
        hour >= start || hour < end
    }
}

/// Choose the prompt for a tick from the drained events.
///
/// Priority: first pending `exec` event, else first pending `cron` event,
/// else the standard prompt stamped with `now`.
pub fn resolve_prompt(pending: &[SystemEvent], now: DateTime<Utc>) -> String {
    if let Some(event) = pending.iter().find(|e| e.kind == SystemEventKind::Exec) {
        return format!(
            "A background command finished: {}\n\
             Review the outcome and follow up if needed. \
             If no action is warranted, reply with exactly {HEARTBEAT_OK}.",
            event.text
        );
    }
    if let Some(event) = pending.iter().find(|e| e.kind == SystemEventKind::Cron) {
        return format!(
            "Reminder due: {}\n\
             Act on it and message the user as appropriate. \
             If no action is warranted, reply with exactly {HEARTBEAT_OK}.",
            event.text
        );
    }
    format!(
        "Heartbeat at {}. Check for anything that needs attention: follow-ups, \
         reminders, or unfinished work. If nothing does, reply with exactly {HEARTBEAT_OK}.",
        now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    )
}

/// Stoppable handle for a running (or disabled) heartbeat.
pub struct HeartbeatHandle {
    task: Option<JoinHandle<()>>,
}

impl HeartbeatHandle {
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::info!("heartbeat stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for HeartbeatHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Start ticking. A disabled config returns an inert, stoppable handle.
///
/// The callback is expected to enqueue the synthetic message into the
/// gateway; it must not block for long and its failures stay its own.
pub fn start_heartbeat(
    config: &HeartbeatConfig,
    events: Arc<SystemEventQueue>,
    callback: impl Fn(AdapterMessage) + Send + Sync + 'static,
) -> HeartbeatHandle {
    if !config.enabled {
        tracing::info!("heartbeat disabled");
        return HeartbeatHandle { task: None };
    }

    let window = match parse_active_hours(&config.active_hours) {
        Some(window) => window,
        None => {
            tracing::warn!(active_hours = %config.active_hours, "invalid active hours, defaulting to all day");
            (0, 24)
        }
    };
    let deliver_to = config.deliver_to.clone();
    let period = Duration::from_secs(config.interval_minutes.max(1) * 60);

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // the zeroth tick fires immediately; the first heartbeat should not
        interval.tick().await;
        loop {
            interval.tick().await;
            let hour = chrono::Local::now().hour();
            if !hour_in_window(hour, window) {
                tracing::debug!(hour, "heartbeat outside active hours, skipping tick");
                continue;
            }
            let pending = events.drain();
            let prompt = resolve_prompt(&pending, Utc::now());
            tracing::debug!(pending = pending.len(), "heartbeat tick");
            callback(AdapterMessage::new(
                HEARTBEAT_SOURCE,
                deliver_to.clone(),
                prompt,
            ));
        }
    });
    tracing::info!("heartbeat armed");
    HeartbeatHandle { task: Some(task) }
}

#[cfg(test)]
#[path = "heartbeat_tests.rs"]
mod tests;
