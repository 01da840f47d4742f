// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pa terminal`: an interactive session against the same gateway the
//! daemon runs.
//!
//! Plain lines become agent turns. Lines starting with `!` run through the
//! shell executor (and its security gate) directly, so the command surface
//! the agent gets is the one you can poke at. `exit` leaves.

use async_trait::async_trait;
use pa_adapters::{
    AgentOptions, ChatAdapter, ChatError, ClaudeCliRunner, Router,
};
use pa_core::{AdapterMessage, Config, SystemEventQueue};
use pa_engine::{Gateway, GatewayContext};
use pa_shell::{ExecOptions, Executor, ProcessRegistry};
use pa_storage::TranscriptStore;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Prints replies to stdout.
struct TerminalAdapter;

#[async_trait]
impl ChatAdapter for TerminalAdapter {
    fn name(&self) -> &str {
        "terminal"
    }

    async fn start(&self) -> Result<(), ChatError> {
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChatError> {
        Ok(())
    }

    async fn send_response(&self, message: &AdapterMessage) -> Result<(), ChatError> {
        println!("{}", message.text);
        Ok(())
    }
}

pub async fn run(config_dir: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_dir)?;
    pa_storage::create_dir_private(&config.security.workspace)?;
    pa_storage::create_dir_private(&config.security.data_dir)?;

    let events = Arc::new(SystemEventQueue::new());
    let registry = Arc::new(ProcessRegistry::new());
    let executor = Executor::new(registry, Arc::clone(&events));

    let gateway = Gateway::new(config.gateway.max_queue_size);
    let router = Arc::new(Router::new());
    router.register(Arc::new(TerminalAdapter) as Arc<dyn ChatAdapter>);

    let ctx = GatewayContext {
        agent: Arc::new(ClaudeCliRunner::new()),
        agent_options: AgentOptions {
            model: config.agent.model.clone(),
            max_turns: config.agent.max_turns,
            workspace: config.security.workspace.clone(),
        },
        router,
        transcripts: Arc::new(TranscriptStore::new()),
        sessions_dir: config.sessions_dir(),
        audit: None,
        session: config.session.clone(),
    };
    let loop_task = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.process_loop(ctx).await })
    };

    println!("pa terminal — plain text talks to the agent, !cmd runs a shell command, exit leaves");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }
        if let Some(cmd) = line.strip_prefix('!') {
            let result = executor
                .exec(ExecOptions::new(cmd.trim()), &config.security)
                .await;
            match (result.output, result.message) {
                (Some(output), _) => print!("{output}"),
                (None, Some(message)) => println!("{message}"),
                (None, None) => {}
            }
            continue;
        }
        gateway.enqueue(AdapterMessage::new("terminal", "local", line));
    }

    gateway.stop();
    let _ = loop_task.await;
    Ok(())
}
