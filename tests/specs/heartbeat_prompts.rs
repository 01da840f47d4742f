// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Heartbeat prompt-selection specs.

use pa_core::config::HeartbeatConfig;
use pa_core::{AdapterMessage, SystemEventKind, SystemEventQueue};
use pa_engine::{is_heartbeat_ok, resolve_prompt, start_heartbeat, HEARTBEAT_SOURCE};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn exec_events_outrank_cron_events() {
    let events = SystemEventQueue::new();
    events.enqueue(SystemEventKind::Cron, "c1");
    events.enqueue(SystemEventKind::Exec, "e1");
    events.enqueue(SystemEventKind::Cron, "c2");

    let prompt = resolve_prompt(&events.drain(), chrono::Utc::now());
    assert!(prompt.contains("e1"));
    assert!(!prompt.contains("c1"));
    assert!(!prompt.contains("c2"));
}

#[tokio::test]
async fn a_tick_drains_events_and_enqueues_a_synthetic_message() {
    let events = Arc::new(SystemEventQueue::new());
    events.enqueue(SystemEventKind::Cron, "c1");
    events.enqueue(SystemEventKind::Exec, "e1");
    events.enqueue(SystemEventKind::Cron, "c2");

    let config = HeartbeatConfig {
        enabled: true,
        interval_minutes: 1,
        active_hours: "0-24".to_string(),
        deliver_to: "telegram".to_string(),
    };
    let received: Arc<Mutex<Vec<AdapterMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);

    tokio::time::pause();
    let mut handle = start_heartbeat(&config, Arc::clone(&events), move |msg| {
        sink.lock().push(msg);
    });
    // let the task start and consume the interval's immediate zeroth tick
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    tokio::time::advance(std::time::Duration::from_secs(61)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    handle.stop();

    let received = received.lock();
    assert_eq!(received.len(), 1);
    let msg = &received[0];
    assert_eq!(msg.source, HEARTBEAT_SOURCE);
    assert_eq!(msg.source_id, "telegram");
    assert!(msg.text.contains("e1"), "exec event won: {}", msg.text);
    assert!(!msg.text.contains("c1"));
    assert!(events.is_empty(), "tick drained the event queue");
}

#[test]
fn sentinel_is_exact_but_forgiving() {
    assert!(is_heartbeat_ok("HEARTBEAT_OK"));
    assert!(is_heartbeat_ok("heartbeat_ok"));
    assert!(is_heartbeat_ok("  HEARTBEAT_OK  "));
    assert!(!is_heartbeat_ok("HEARTBEAT_OK and more"));
}
