// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use pa_adapters::{ChatAdapter, FakeAgentRunner, FakeChatAdapter};
use std::time::{Duration, Instant};

struct Fixture {
    gateway: Arc<Gateway>,
    agent: FakeAgentRunner,
    adapter: Arc<FakeChatAdapter>,
    transcripts: Arc<TranscriptStore>,
    dir: tempfile::TempDir,
}

fn fixture(max_queue: usize) -> (Fixture, GatewayContext) {
    let dir = tempfile::tempdir().unwrap();
    let agent = FakeAgentRunner::new();
    let adapter = Arc::new(FakeChatAdapter::new("telegram"));
    let router = Arc::new(Router::new());
    router.register(Arc::clone(&adapter) as Arc<dyn ChatAdapter>);
    let transcripts = Arc::new(TranscriptStore::new());

    let ctx = GatewayContext {
        agent: Arc::new(agent.clone()),
        agent_options: AgentOptions::default(),
        router,
        transcripts: Arc::clone(&transcripts),
        sessions_dir: dir.path().join("sessions"),
        audit: Some(AuditLog::new(dir.path().join("workspace"))),
        session: SessionConfig::default(),
    };
    let fixture = Fixture {
        gateway: Gateway::new(max_queue),
        agent,
        adapter,
        transcripts,
        dir,
    };
    (fixture, ctx)
}

async fn wait_until<F: Fn() -> bool>(what: &str, predicate: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !predicate() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

#[tokio::test]
async fn processes_in_global_fifo_order() {
    let (f, ctx) = fixture(10);
    f.agent.set_delay(Duration::from_millis(20));

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "first"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "2", "second"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "third"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("three replies", || f.adapter.sent().len() == 3).await;
    f.gateway.stop();
    let _ = loop_task.await;

    let prompts: Vec<_> = f.agent.calls().iter().map(|c| c.prompt.clone()).collect();
    assert_eq!(prompts, vec!["first", "second", "third"]);
    let replies: Vec<_> = f.adapter.sent().iter().map(|m| m.text.clone()).collect();
    assert_eq!(replies, vec!["echo: first", "echo: second", "echo: third"]);
}

#[tokio::test]
async fn overflow_drops_newest() {
    let (f, ctx) = fixture(2);

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "kept-1"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "kept-2"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "dropped"));
    assert_eq!(f.gateway.len(), 2);

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("two turns", || f.agent.calls().len() == 2).await;
    // give the loop a beat to prove no third turn arrives
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(f.agent.calls().len(), 2);
    let prompts: Vec<_> = f.agent.calls().iter().map(|c| c.prompt.clone()).collect();
    assert_eq!(prompts, vec!["kept-1", "kept-2"]);

    f.gateway.stop();
    let _ = loop_task.await;
}

#[tokio::test]
async fn heartbeat_ok_suppresses_reply_but_keeps_transcript() {
    let (f, ctx) = fixture(10);
    f.agent.push_reply("  heartbeat_ok  ");

    f.gateway
        .enqueue(AdapterMessage::new(HEARTBEAT_SOURCE, "telegram", "pulse"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("turn ran", || f.agent.calls().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(f.adapter.sent().is_empty(), "no outbound for HEARTBEAT_OK");

    let path = f.dir.path().join("sessions/heartbeat--telegram.jsonl");
    let transcript = f.transcripts.load_transcript(&path).unwrap();
    assert_eq!(transcript.len(), 2, "transcript still appended");

    f.gateway.stop();
    let _ = loop_task.await;
}

#[tokio::test]
async fn heartbeat_with_substantive_reply_goes_to_the_deliver_to_destination() {
    let (f, ctx) = fixture(10);
    f.agent.push_reply("HEARTBEAT_OK and more");

    f.gateway
        .enqueue(AdapterMessage::new(HEARTBEAT_SOURCE, "telegram--99", "pulse"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("reply routed", || !f.adapter.sent().is_empty()).await;
    let sent = f.adapter.sent();
    assert_eq!(sent[0].source, "telegram");
    assert_eq!(sent[0].source_id, "99");
    assert_eq!(sent[0].text, "HEARTBEAT_OK and more");

    f.gateway.stop();
    let _ = loop_task.await;
}

#[tokio::test]
async fn failed_turn_sends_error_reply_and_continues() {
    let (f, ctx) = fixture(10);
    f.agent.fail_next();

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "boom"));
    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "after"));

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("both handled", || f.adapter.sent().len() == 2).await;
    let sent = f.adapter.sent();
    assert!(sent[0].text.contains("failed"));
    assert_eq!(sent[1].text, "echo: after");

    f.gateway.stop();
    let _ = loop_task.await;
}

#[tokio::test]
async fn stop_prevents_new_turns_and_enqueues() {
    let (f, ctx) = fixture(10);
    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    f.gateway.stop();
    let _ = loop_task.await;

    f.gateway.enqueue(AdapterMessage::new("telegram", "1", "late"));
    assert!(f.gateway.is_empty(), "enqueue after stop is a no-op");
    assert!(f.agent.calls().is_empty());
}

#[tokio::test]
async fn transcript_is_compacted_past_the_history_limit() {
    let (f, mut ctx) = fixture(10);
    ctx.session.max_history_messages = 4;

    for i in 0..4 {
        f.gateway
            .enqueue(AdapterMessage::new("telegram", "1", format!("m{i}")));
    }

    let gateway = Arc::clone(&f.gateway);
    let loop_task = tokio::spawn(async move { gateway.process_loop(ctx).await });

    wait_until("four replies", || f.adapter.sent().len() == 4).await;
    f.gateway.stop();
    let _ = loop_task.await;

    let path = f.dir.path().join("sessions/telegram--1.jsonl");
    let transcript = f.transcripts.load_transcript(&path).unwrap();
    assert_eq!(transcript.len(), 4, "8 appended, compacted to 4");
    assert_eq!(transcript[2].content, "m3");
    assert_eq!(transcript[3].content, "echo: m3");
}
