// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transcript integrity under concurrent writers.

use pa_core::{resolve_session_key, SessionMessage};
use pa_storage::TranscriptStore;
use std::sync::Arc;

#[test]
fn ten_concurrent_appends_yield_ten_intact_lines() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(TranscriptStore::new());
    let key = resolve_session_key("telegram", "12345", None);
    let path = dir.path().join(format!("{key}.jsonl"));

    let handles: Vec<_> = (0..10)
        .map(|i| {
            let store = Arc::clone(&store);
            let path = path.clone();
            std::thread::spawn(move || {
                store
                    .append_message(&path, &SessionMessage::user(format!("m_{i}")))
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // every line parses, every message distinct
    let raw = std::fs::read_to_string(&path).unwrap();
    assert_eq!(raw.lines().count(), 10);
    for line in raw.lines() {
        serde_json::from_str::<SessionMessage>(line).unwrap();
    }

    let loaded = store.load_transcript(&path).unwrap();
    let mut contents: Vec<_> = loaded.iter().map(|m| m.content.clone()).collect();
    contents.sort();
    contents.dedup();
    assert_eq!(contents.len(), 10);
}

#[test]
fn session_keys_are_deterministic_and_thread_suffixed() {
    let plain = resolve_session_key("slack", "C042", None);
    let threaded = resolve_session_key("slack", "C042", Some("1699.42"));
    assert_eq!(plain, "slack--C042");
    assert_eq!(threaded, format!("{plain}--1699.42"));
}
