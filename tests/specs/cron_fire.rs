// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron fire + re-arm specs.

use crate::prelude::wait_until;
use chrono::{Duration as ChronoDuration, Utc};
use pa_core::{CronJob, CronPayload, CronSchedule, SystemEventKind, SystemEventQueue};
use pa_engine::CronManager;
use pa_storage::CronStore;
use parking_lot::Mutex;
use std::sync::Arc;
use uuid::Uuid;

#[tokio::test]
async fn oneshot_fires_once_publishes_event_and_rearms_the_cron_job() {
    let dir = tempfile::tempdir().unwrap();
    let store = CronStore::new(dir.path().join("cron-jobs.json"));
    let events = Arc::new(SystemEventQueue::new());

    let daily = CronJob::new(
        "morning review",
        CronSchedule::Cron {
            expression: "0 9 * * *".to_string(),
        },
        CronPayload::new("review"),
    );
    let mut soon = CronJob::new(
        "one shot",
        CronSchedule::Oneshot {
            iso: Utc::now() + ChronoDuration::milliseconds(50),
        },
        CronPayload::new("fire me"),
    );
    soon.delete_after_run = true;
    let soon_id = soon.id;
    store.save(&[daily.clone(), soon]).unwrap();

    let manager = CronManager::new(store.clone(), Arc::clone(&events));
    let fired: Arc<Mutex<Vec<Uuid>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&fired);
    manager.set_on_job_fired(Arc::new(move |job| sink.lock().push(job.id)));

    manager.rearm_timer();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    wait_until("oneshot fired", || !fired.lock().is_empty()).await;
    assert_eq!(*fired.lock(), vec![soon_id], "fired exactly once");

    // the fire published a `cron` system event with the payload text
    let pending = events.peek();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].kind, SystemEventKind::Cron);
    assert_eq!(pending[0].text, "fire me");

    // deleteAfterRun removed the one-shot; the cron job is the armed one
    wait_until("rearm", || manager.armed_job() == Some(daily.id)).await;
    let remaining = store.load();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, daily.id);

    manager.stop();
}

#[tokio::test]
async fn fire_updates_last_fired_at_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let store = CronStore::new(dir.path().join("cron-jobs.json"));
    let events = Arc::new(SystemEventQueue::new());

    let job = CronJob::new(
        "tick",
        CronSchedule::Oneshot {
            iso: Utc::now() + ChronoDuration::milliseconds(30),
        },
        CronPayload::new("tick"),
    );
    store.save(&[job]).unwrap();

    let manager = CronManager::new(store.clone(), events);
    manager.rearm_timer();

    wait_until("persisted fire", || {
        store.load().first().and_then(|j| j.last_fired_at).is_some()
    })
    .await;
    manager.stop();
}

#[tokio::test]
async fn label_stands_in_for_an_empty_payload_text() {
    let dir = tempfile::tempdir().unwrap();
    let store = CronStore::new(dir.path().join("cron-jobs.json"));
    let events = Arc::new(SystemEventQueue::new());

    let job = CronJob::new(
        "water the plants",
        CronSchedule::Oneshot {
            iso: Utc::now() + ChronoDuration::milliseconds(30),
        },
        CronPayload::new(""),
    );
    store.save(&[job]).unwrap();

    let manager = CronManager::new(store, Arc::clone(&events));
    manager.rearm_timer();

    wait_until("event", || !events.is_empty()).await;
    assert_eq!(events.peek()[0].text, "water the plants");
    manager.stop();
}
