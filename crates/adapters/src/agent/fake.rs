// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake agent runner for tests.

use super::{AgentError, AgentOptions, AgentRunner, TurnOutcome};
use async_trait::async_trait;
use pa_core::SessionMessage;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One recorded `run_turn` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentCall {
    pub prompt: String,
    pub session_key: String,
}

/// Scripted agent: replies are popped from a queue, falling back to an
/// echo of the prompt. Records every call.
#[derive(Clone, Default)]
pub struct FakeAgentRunner {
    replies: Arc<Mutex<VecDeque<String>>>,
    fixed_reply: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<AgentCall>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    fail_next: Arc<Mutex<bool>>,
}

impl FakeAgentRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Echo `echo: {prompt}` on every turn (the default behavior).
    pub fn echoing() -> Self {
        Self::default()
    }

    /// Queue one scripted reply.
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies.lock().push_back(reply.into());
    }

    /// Reply with the same text on every turn.
    pub fn with_fixed_reply(reply: impl Into<String>) -> Self {
        let fake = Self::default();
        *fake.fixed_reply.lock() = Some(reply.into());
        fake
    }

    /// Sleep before answering, to widen race windows in tests.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }

    /// Fail the next turn with an error.
    pub fn fail_next(&self) {
        *self.fail_next.lock() = true;
    }

    pub fn calls(&self) -> Vec<AgentCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl AgentRunner for FakeAgentRunner {
    async fn run_turn(
        &self,
        prompt: &str,
        session_key: &str,
        _options: &AgentOptions,
    ) -> Result<TurnOutcome, AgentError> {
        self.calls.lock().push(AgentCall {
            prompt: prompt.to_string(),
            session_key: session_key.to_string(),
        });

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if std::mem::take(&mut *self.fail_next.lock()) {
            return Err(AgentError::Failed("scripted failure".to_string()));
        }

        let reply = self
            .replies
            .lock()
            .pop_front()
            .or_else(|| self.fixed_reply.lock().clone())
            .unwrap_or_else(|| format!("echo: {prompt}"));

        Ok(TurnOutcome {
            messages: vec![
                SessionMessage::user(prompt),
                SessionMessage::assistant(reply.clone()),
            ],
            reply,
        })
    }
}
