// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent runner backed by the `claude` CLI.
//!
//! Each turn runs `claude -p <prompt> --output-format json` in the
//! workspace and parses the result envelope. The CLI owns its own context
//! management; the daemon's transcript store is the durable record.

use super::{AgentError, AgentOptions, AgentRunner, TurnOutcome};
use async_trait::async_trait;
use pa_core::SessionMessage;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Safety net for a single turn.
const TURN_TIMEOUT: Duration = Duration::from_secs(600);

/// Shells out to the `claude` binary for each turn.
pub struct ClaudeCliRunner {
    binary: String,
}

impl ClaudeCliRunner {
    pub fn new() -> Self {
        Self {
            binary: "claude".to_string(),
        }
    }

    /// Use a different binary (e.g. a stub in tests).
    pub fn with_binary(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Pull the assistant text out of the CLI's JSON result envelope.
    fn parse_reply(stdout: &str) -> Result<String, AgentError> {
        let value: serde_json::Value = serde_json::from_str(stdout.trim())
            .map_err(|e| AgentError::InvalidOutput(format!("bad result JSON: {e}")))?;
        match value.get("result").and_then(|r| r.as_str()) {
            Some(reply) => Ok(reply.to_string()),
            None => Err(AgentError::InvalidOutput(
                "result envelope missing `result` field".to_string(),
            )),
        }
    }
}

impl Default for ClaudeCliRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AgentRunner for ClaudeCliRunner {
    async fn run_turn(
        &self,
        prompt: &str,
        session_key: &str,
        options: &AgentOptions,
    ) -> Result<TurnOutcome, AgentError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p")
            .arg(prompt)
            .arg("--output-format")
            .arg("json")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if !options.model.is_empty() {
            cmd.arg("--model").arg(&options.model);
        }
        if options.max_turns > 0 {
            cmd.arg("--max-turns").arg(options.max_turns.to_string());
        }
        if options.workspace.as_os_str().is_empty() {
            tracing::debug!("no workspace configured, running turn in cwd");
        } else {
            cmd.current_dir(&options.workspace);
        }

        tracing::info!(session = session_key, "running agent turn");
        let output = match tokio::time::timeout(TURN_TIMEOUT, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(AgentError::Spawn(e.to_string())),
            Err(_) => {
                return Err(AgentError::Failed(format!(
                    "turn timed out after {}s",
                    TURN_TIMEOUT.as_secs()
                )))
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Failed(format!(
                "claude exited with {:?}: {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let reply = Self::parse_reply(&stdout)?;
        let messages = vec![
            SessionMessage::user(prompt),
            SessionMessage::assistant(reply.clone()),
        ];
        Ok(TurnOutcome { messages, reply })
    }
}

#[cfg(test)]
#[path = "claude_tests.rs"]
mod tests;
