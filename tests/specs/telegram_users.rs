// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telegram allowed-user gating.
//!
//! Deliberate deviation from the original behavior: with a non-empty
//! allowlist, an update carrying no sender id is rejected instead of
//! accepted-by-absence-of-a-negative-match.

use pa_adapters::{ChatAdapter, FakeTelegramApi, TelegramAdapter};
use pa_core::AdapterMessage;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn raw_update(update_id: i64, from: Option<serde_json::Value>, text: &str) -> serde_json::Value {
    let mut message = serde_json::json!({
        "chat": { "id": 42 },
        "text": text,
    });
    if let Some(from) = from {
        message["from"] = from;
    }
    serde_json::json!({ "update_id": update_id, "message": message })
}

async fn deliver(allowed: Vec<i64>, updates: Vec<serde_json::Value>) -> Vec<String> {
    let api = Arc::new(FakeTelegramApi::new());
    let batch = updates
        .into_iter()
        .map(|u| serde_json::from_value(u).unwrap())
        .collect();
    api.push_batch(batch);

    let received: Arc<Mutex<Vec<AdapterMessage>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    let adapter = TelegramAdapter::new_shared(
        api,
        allowed,
        Arc::new(move |msg| sink.lock().push(msg)),
    );

    adapter.start().await.unwrap();
    let deadline = Instant::now() + Duration::from_millis(500);
    while Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    adapter.stop().await.unwrap();

    let texts = received.lock().iter().map(|m| m.text.clone()).collect();
    texts
}

#[tokio::test]
async fn listed_users_pass_unlisted_and_anonymous_are_rejected() {
    let delivered = deliver(
        vec![7],
        vec![
            raw_update(1, Some(serde_json::json!({ "id": 7 })), "from seven"),
            raw_update(2, Some(serde_json::json!({ "id": 9 })), "from nine"),
            raw_update(3, None, "from nobody"),
        ],
    )
    .await;

    assert_eq!(delivered, vec!["from seven".to_string()]);
}

#[tokio::test]
async fn empty_allowlist_admits_everyone_including_anonymous() {
    let delivered = deliver(
        vec![],
        vec![
            raw_update(1, Some(serde_json::json!({ "id": 9 })), "anyone"),
            raw_update(2, None, "nobody"),
        ],
    )
    .await;

    assert_eq!(delivered, vec!["anyone".to_string(), "nobody".to_string()]);
}
