// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-turn contract.
//!
//! One turn consumes a user or heartbeat prompt for a session and returns
//! the transcript messages it produced, ending in an assistant reply. The
//! gateway is the only caller and awaits one turn at a time.

mod claude;

pub use claude::ClaudeCliRunner;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{AgentCall, FakeAgentRunner};

use async_trait::async_trait;
use pa_core::SessionMessage;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from an agent turn.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent spawn failed: {0}")]
    Spawn(String),
    #[error("agent produced invalid output: {0}")]
    InvalidOutput(String),
    #[error("agent turn failed: {0}")]
    Failed(String),
}

/// Options carried into every turn, built once from config at startup.
#[derive(Debug, Clone, Default)]
pub struct AgentOptions {
    /// Model identifier; empty means the runner's default.
    pub model: String,
    /// Bound on the agent's internal tool-use depth for one turn.
    pub max_turns: u32,
    /// Workspace directory turns run in.
    pub workspace: PathBuf,
}

/// What one turn produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// Messages to append to the session transcript, in order.
    pub messages: Vec<SessionMessage>,
    /// The assistant's final text, routed back to the source.
    pub reply: String,
}

/// The external LLM agent.
#[async_trait]
pub trait AgentRunner: Send + Sync + 'static {
    async fn run_turn(
        &self,
        prompt: &str,
        session_key: &str,
        options: &AgentOptions,
    ) -> Result<TurnOutcome, AgentError>;
}
