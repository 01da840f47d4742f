// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the spec tests.

use pa_adapters::{AgentOptions, ChatAdapter, FakeAgentRunner, FakeChatAdapter, Router};
use pa_core::config::SessionConfig;
use pa_engine::{Gateway, GatewayContext};
use pa_storage::TranscriptStore;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct GatewayFixture {
    pub gateway: Arc<Gateway>,
    pub agent: FakeAgentRunner,
    pub adapters: Vec<Arc<FakeChatAdapter>>,
    pub transcripts: Arc<TranscriptStore>,
    pub dir: tempfile::TempDir,
}

impl GatewayFixture {
    /// A gateway wired to fake adapters (by name) and a fake agent.
    pub fn new(max_queue: usize, adapter_names: &[&str]) -> (Self, GatewayContext) {
        let dir = tempfile::tempdir().unwrap();
        let agent = FakeAgentRunner::new();
        let router = Arc::new(Router::new());
        let adapters: Vec<Arc<FakeChatAdapter>> = adapter_names
            .iter()
            .map(|name| {
                let adapter = Arc::new(FakeChatAdapter::new(*name));
                router.register(Arc::clone(&adapter) as Arc<dyn ChatAdapter>);
                adapter
            })
            .collect();
        let transcripts = Arc::new(TranscriptStore::new());

        let ctx = GatewayContext {
            agent: Arc::new(agent.clone()),
            agent_options: AgentOptions::default(),
            router,
            transcripts: Arc::clone(&transcripts),
            sessions_dir: dir.path().join("sessions"),
            audit: None,
            session: SessionConfig::default(),
        };
        let fixture = Self {
            gateway: Gateway::new(max_queue),
            agent,
            adapters,
            transcripts,
            dir,
        };
        (fixture, ctx)
    }

    pub fn adapter(&self, name: &str) -> &Arc<FakeChatAdapter> {
        self.adapters
            .iter()
            .find(|a| a.name() == name)
            .expect("adapter registered")
    }
}

/// Poll until `predicate` holds or a 5 s deadline passes.
pub async fn wait_until<F: Fn() -> bool>(what: &str, predicate: F) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !predicate() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
