// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The gateway: a bounded FIFO of adapter messages and the single-consumer
//! loop that drives agent turns.
//!
//! Guarantees:
//! - at most one agent turn is in flight, across all sources;
//! - FIFO order is global (no per-session queues);
//! - producers never block: past capacity the newest message is dropped
//!   with a logged warning and the caller observes no error;
//! - a failed turn is isolated: it is logged, surfaced as an error reply to
//!   non-heartbeat sources, and the loop moves on;
//! - a heartbeat answered with the sentinel is suppressed; any other
//!   heartbeat reply is routed to the `deliverTo` destination carried in
//!   the synthetic message's `source_id`;
//! - `stop()` lets the current turn finish but starts no new one.

use crate::heartbeat::{is_heartbeat_ok, HEARTBEAT_SOURCE};
use pa_adapters::{AgentOptions, AgentRunner, Router};
use pa_core::config::SessionConfig;
use pa_core::{resolve_session_key, AdapterMessage};
use pa_storage::{AuditEntry, AuditLog, TranscriptStore};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Everything the consumer loop needs besides the queue itself.
pub struct GatewayContext {
    pub agent: Arc<dyn AgentRunner>,
    pub agent_options: AgentOptions,
    pub router: Arc<Router>,
    pub transcripts: Arc<TranscriptStore>,
    /// Directory holding `{sessionKey}.jsonl` transcripts.
    pub sessions_dir: PathBuf,
    pub audit: Option<AuditLog>,
    pub session: SessionConfig,
}

/// Bounded multi-producer, single-consumer message queue.
pub struct Gateway {
    queue: Mutex<VecDeque<AdapterMessage>>,
    notify: Notify,
    stopped: AtomicBool,
    max_queue_size: usize,
}

impl Gateway {
    pub fn new(max_queue_size: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            stopped: AtomicBool::new(false),
            max_queue_size: max_queue_size.max(1),
        })
    }

    /// Append a message; safe to call from any task. Past capacity the
    /// message is dropped with a warning. After `stop()` enqueues are
    /// ignored.
    pub fn enqueue(&self, msg: AdapterMessage) {
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        {
            let mut queue = self.queue.lock();
            if queue.len() >= self.max_queue_size {
                tracing::warn!(
                    source = %msg.source,
                    max = self.max_queue_size,
                    "gateway queue full, dropping newest message"
                );
                return;
            }
            queue.push_back(msg);
        }
        self.notify.notify_one();
    }

    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    /// Signal the loop to exit once the current turn completes.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// The single-consumer loop. Runs until `stop()`.
    pub async fn process_loop(&self, ctx: GatewayContext) {
        tracing::info!("gateway loop started");
        loop {
            if self.is_stopped() {
                break;
            }
            let msg = self.queue.lock().pop_front();
            let Some(msg) = msg else {
                self.notify.notified().await;
                continue;
            };
            self.process_one(&ctx, msg).await;
        }
        tracing::info!("gateway loop stopped");
    }

    async fn process_one(&self, ctx: &GatewayContext, msg: AdapterMessage) {
        let session_key = resolve_session_key(&msg.source, &msg.source_id, msg.thread_id());
        let transcript_path = ctx.sessions_dir.join(format!("{session_key}.jsonl"));
        tracing::debug!(session = %session_key, source = %msg.source, "starting agent turn");

        match ctx
            .agent
            .run_turn(&msg.text, &session_key, &ctx.agent_options)
            .await
        {
            Ok(outcome) => {
                if let Err(e) = ctx
                    .transcripts
                    .append_messages(&transcript_path, &outcome.messages)
                {
                    tracing::error!(session = %session_key, error = %e, "transcript append failed");
                }
                self.compact_if_needed(ctx, &transcript_path, &session_key);
                self.audit(ctx, &session_key, &msg.source, true);

                let heartbeat = msg.source == HEARTBEAT_SOURCE;
                if heartbeat && is_heartbeat_ok(&outcome.reply) {
                    tracing::debug!(session = %session_key, "heartbeat acknowledged, no reply routed");
                    return;
                }

                // A substantive heartbeat reply has no originating adapter;
                // it goes to the configured deliverTo destination instead
                // (the synthetic message's source_id).
                let (source, source_id) = if heartbeat {
                    heartbeat_destination(&msg.source_id)
                } else {
                    (msg.source.clone(), msg.source_id.clone())
                };
                let reply = AdapterMessage {
                    source,
                    source_id,
                    text: outcome.reply,
                    metadata: msg.metadata.clone(),
                };
                if let Err(e) = ctx.router.send_response(&reply).await {
                    tracing::error!(session = %session_key, error = %e, "reply delivery failed");
                }
            }
            Err(e) => {
                tracing::error!(session = %session_key, error = %e, "agent turn failed");
                self.audit(ctx, &session_key, &msg.source, false);
                if msg.source == HEARTBEAT_SOURCE {
                    return;
                }
                let reply = AdapterMessage {
                    source: msg.source.clone(),
                    source_id: msg.source_id.clone(),
                    text: format!("Sorry, that request failed: {e}"),
                    metadata: msg.metadata.clone(),
                };
                if let Err(e) = ctx.router.send_response(&reply).await {
                    tracing::error!(session = %session_key, error = %e, "error reply delivery failed");
                }
            }
        }
    }

    /// Trim a transcript to the newest `max_history_messages` lines.
    fn compact_if_needed(&self, ctx: &GatewayContext, path: &std::path::Path, session: &str) {
        if !ctx.session.compaction_enabled || ctx.session.max_history_messages == 0 {
            return;
        }
        let messages = match ctx.transcripts.load_transcript(path) {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(session, error = %e, "compaction skipped, transcript unreadable");
                return;
            }
        };
        let max = ctx.session.max_history_messages;
        if messages.len() <= max {
            return;
        }
        let keep = &messages[messages.len() - max..];
        match ctx.transcripts.rewrite_transcript(path, keep) {
            Ok(()) => tracing::info!(session, trimmed = messages.len() - max, "transcript compacted"),
            Err(e) => tracing::warn!(session, error = %e, "transcript compaction failed"),
        }
    }

    fn audit(&self, ctx: &GatewayContext, session_key: &str, source: &str, ok: bool) {
        if let Some(audit) = &ctx.audit {
            if let Err(e) = audit.append(&AuditEntry::new(session_key, source, ok)) {
                tracing::warn!(error = %e, "audit append failed");
            }
        }
    }
}

/// Split a heartbeat `deliverTo` into `(adapter, conversation)`.
///
/// `"telegram--123"` targets conversation `123` on the telegram adapter; a
/// bare adapter name leaves the conversation empty and the adapter applies
/// its own default.
fn heartbeat_destination(deliver_to: &str) -> (String, String) {
    match deliver_to.split_once("--") {
        Some((adapter, conversation)) => (adapter.to_string(), conversation.to_string()),
        None => (deliver_to.to_string(), String::new()),
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
