// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway ordering, single-flight, and backpressure specs.

use crate::prelude::*;
use pa_core::AdapterMessage;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn fifo_across_mixed_sources_with_heartbeat_suppression() {
    let (f, ctx) = GatewayFixture::new(10, &["telegram", "slack"]);
    f.agent.set_delay(Duration::from_millis(20));
    f.agent.push_reply("re: A");
    f.agent.push_reply("re: B");
    f.agent.push_reply("HEARTBEAT_OK");

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "A"));
    f.gateway.enqueue(AdapterMessage::new("slack", "C9", "B"));
    f.gateway.enqueue(AdapterMessage::new("heartbeat", "telegram", "H"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("all three turns", || f.agent.calls().len() == 3).await;
    tokio::time::sleep(Duration::from_millis(40)).await;
    f.gateway.stop();
    let _ = loop_task.await;

    // turns ran in enqueue order, one at a time
    let prompts: Vec<_> = f.agent.calls().iter().map(|c| c.prompt.clone()).collect();
    assert_eq!(prompts, vec!["A", "B", "H"]);

    // replies routed to the right adapters, heartbeat suppressed
    let telegram: Vec<_> = f.adapter("telegram").sent();
    assert_eq!(telegram.len(), 1);
    assert_eq!(telegram[0].text, "re: A");
    let slack: Vec<_> = f.adapter("slack").sent();
    assert_eq!(slack.len(), 1);
    assert_eq!(slack[0].text, "re: B");
}

#[tokio::test]
async fn overflow_drops_the_newest_before_the_consumer_starts() {
    let (f, ctx) = GatewayFixture::new(2, &["telegram"]);

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "one"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "two"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "three"));
    assert_eq!(f.gateway.len(), 2, "queue is bounded");

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("two turns", || f.agent.calls().len() == 2).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    f.gateway.stop();
    let _ = loop_task.await;

    let prompts: Vec<_> = f.agent.calls().iter().map(|c| c.prompt.clone()).collect();
    assert_eq!(prompts, vec!["one", "two"], "the newest message was dropped");
}

#[tokio::test]
async fn substantive_heartbeat_reply_reaches_the_deliver_to_destination() {
    let (f, ctx) = GatewayFixture::new(10, &["telegram"]);
    f.agent.push_reply("you asked me to remind you: stretch");

    f.gateway
        .enqueue(AdapterMessage::new("heartbeat", "telegram--42", "reminder prompt"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("reply delivered", || !f.adapter("telegram").sent().is_empty()).await;
    f.gateway.stop();
    let _ = loop_task.await;

    let sent = f.adapter("telegram").sent();
    assert_eq!(sent[0].source, "telegram");
    assert_eq!(sent[0].source_id, "42");
    assert_eq!(sent[0].text, "you asked me to remind you: stretch");
}

#[tokio::test]
async fn turns_never_overlap() {
    let (f, ctx) = GatewayFixture::new(10, &["telegram"]);
    f.agent.set_delay(Duration::from_millis(15));

    for i in 0..5 {
        f.gateway
            .enqueue(AdapterMessage::new("telegram", "1", format!("m{i}")));
    }
    let started = std::time::Instant::now();
    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("five turns", || f.agent.calls().len() == 5).await;
    // five serial 15 ms turns cannot complete faster than ~75 ms
    assert!(started.elapsed() >= Duration::from_millis(70), "turns overlapped");

    f.gateway.stop();
    let _ = loop_task.await;
}

#[tokio::test]
async fn sessions_are_keyed_by_source_and_thread() {
    let (f, ctx) = GatewayFixture::new(10, &["telegram"]);

    f.gateway.enqueue(
        AdapterMessage::new("telegram", "42--7", "threaded").with_metadata("threadId", "7"),
    );
    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("turn ran", || f.agent.calls().len() == 1).await;
    f.gateway.stop();
    let _ = loop_task.await;

    let key = f.agent.calls()[0].session_key.clone();
    assert_eq!(key, "telegram--42--7--7");

    // the transcript landed under that key
    let path = f.dir.path().join(format!("sessions/{key}.jsonl"));
    let transcript = f.transcripts.load_transcript(&path).unwrap();
    assert_eq!(transcript.len(), 2);
}
