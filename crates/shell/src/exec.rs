// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shell executor.
//!
//! Commands pass the security gate, then run under `sh -c` with stdout and
//! stderr captured into a single growing string. Three modes:
//!
//! - **foreground**: await exit, return output and exit code;
//! - **background**: register in the process registry and return a session
//!   id immediately; the exit is observed by a watcher task that publishes
//!   an `exec` system event;
//! - **yield**: register, then race exit against a timer — exit-first gives
//!   a foreground-style result, timeout-first returns output-so-far and
//!   leaves the child running with the exit watcher still armed.
//!
//! The executor never cancels children; shutdown relies on process exit to
//! reap them.

use crate::guard::{self, Verdict};
use crate::registry::ProcessRegistry;
use pa_core::config::SecurityConfig;
use pa_core::{SystemEventKind, SystemEventQueue};
use parking_lot::Mutex;
use serde::Serialize;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// One execution request.
#[derive(Debug, Clone, Default)]
pub struct ExecOptions {
    pub command: String,
    pub background: bool,
    /// Milliseconds to wait before yielding back with output-so-far.
    pub yield_ms: Option<u64>,
}

impl ExecOptions {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn background(mut self) -> Self {
        self.background = true;
        self
    }

    pub fn yield_after(mut self, ms: u64) -> Self {
        self.yield_ms = Some(ms);
        self
    }
}

/// Outcome of an execution request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExecResult {
    fn blocked(reason: String) -> Self {
        Self {
            success: false,
            output: None,
            exit_code: None,
            session_id: None,
            message: Some(reason),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            output: None,
            exit_code: None,
            session_id: None,
            message: Some(message),
        }
    }
}

/// Where captured output accumulates.
#[derive(Clone)]
enum Sink {
    Local(Arc<Mutex<String>>),
    Session(Arc<ProcessRegistry>, Uuid),
}

impl Sink {
    fn push(&self, chunk: &str) {
        match self {
            Sink::Local(buffer) => buffer.lock().push_str(chunk),
            Sink::Session(registry, id) => registry.append_output(*id, chunk),
        }
    }
}

fn spawn_capture<R>(mut stream: R, sink: Sink) -> JoinHandle<()>
where
    R: tokio::io::AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = [0u8; 4096];
        loop {
            match stream.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => sink.push(&String::from_utf8_lossy(&buf[..n])),
            }
        }
    })
}

/// Executes shell commands on behalf of the agent.
pub struct Executor {
    registry: Arc<ProcessRegistry>,
    events: Arc<SystemEventQueue>,
}

impl Executor {
    pub fn new(registry: Arc<ProcessRegistry>, events: Arc<SystemEventQueue>) -> Self {
        Self { registry, events }
    }

    pub fn registry(&self) -> &Arc<ProcessRegistry> {
        &self.registry
    }

    /// Run a command under the security gate.
    pub async fn exec(&self, options: ExecOptions, security: &SecurityConfig) -> ExecResult {
        if let Verdict::Block { reason } = guard::classify(&options.command, security) {
            tracing::warn!(command = %options.command, %reason, "command blocked");
            return ExecResult::blocked(reason);
        }

        self.registry.sweep();

        let mut child = match Command::new("sh")
            .arg("-c")
            .arg(&options.command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(command = %options.command, error = %e, "spawn failed");
                return ExecResult::failed(format!("failed to spawn: {e}"));
            }
        };
        let pid = child.id().unwrap_or_default();

        if options.background {
            let id = self.registry.add(&options.command, pid);
            let readers = self.capture_into_session(&mut child, id);
            self.spawn_exit_watcher(child, id, options.command.clone(), readers);
            tracing::info!(session = %id, pid, command = %options.command, "running in background");
            return ExecResult {
                success: true,
                output: None,
                exit_code: None,
                session_id: Some(id),
                message: Some(format!("running in background (pid {pid})")),
            };
        }

        if let Some(ms) = options.yield_ms {
            let id = self.registry.add(&options.command, pid);
            let readers = self.capture_into_session(&mut child, id);

            tokio::select! {
                status = child.wait() => {
                    for reader in readers {
                        let _ = reader.await;
                    }
                    let exit_code = status.as_ref().ok().and_then(|s| s.code());
                    self.registry.mark_exited(id, exit_code);
                    let output = self
                        .registry
                        .get(id)
                        .map(|s| s.output)
                        .unwrap_or_default();
                    return ExecResult {
                        success: status.map(|s| s.success()).unwrap_or(false),
                        output: Some(output),
                        exit_code,
                        session_id: Some(id),
                        message: None,
                    };
                }
                _ = tokio::time::sleep(Duration::from_millis(ms)) => {
                    let output = self
                        .registry
                        .get(id)
                        .map(|s| s.output)
                        .unwrap_or_default();
                    self.spawn_exit_watcher(child, id, options.command.clone(), readers);
                    tracing::info!(session = %id, pid, yielded_after_ms = ms, "yielding with process still running");
                    return ExecResult {
                        success: true,
                        output: Some(output),
                        exit_code: None,
                        session_id: Some(id),
                        message: None,
                    };
                }
            }
        }

        // foreground
        let buffer = Arc::new(Mutex::new(String::new()));
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_capture(stdout, Sink::Local(Arc::clone(&buffer))));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_capture(stderr, Sink::Local(Arc::clone(&buffer))));
        }

        let status = child.wait().await;
        for reader in readers {
            let _ = reader.await;
        }
        let output = buffer.lock().clone();
        match status {
            Ok(status) => ExecResult {
                success: status.success(),
                output: Some(output),
                exit_code: status.code(),
                session_id: None,
                message: None,
            },
            Err(e) => ExecResult::failed(format!("wait failed: {e}")),
        }
    }

    fn capture_into_session(&self, child: &mut Child, id: Uuid) -> Vec<JoinHandle<()>> {
        let mut readers = Vec::new();
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_capture(
                stdout,
                Sink::Session(Arc::clone(&self.registry), id),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_capture(
                stderr,
                Sink::Session(Arc::clone(&self.registry), id),
            ));
        }
        readers
    }

    /// Observe a detached child's exit: record it and publish an `exec`
    /// system event for the next heartbeat.
    fn spawn_exit_watcher(
        &self,
        mut child: Child,
        id: Uuid,
        command: String,
        readers: Vec<JoinHandle<()>>,
    ) {
        let registry = Arc::clone(&self.registry);
        let events = Arc::clone(&self.events);
        tokio::spawn(async move {
            let status = child.wait().await;
            for reader in readers {
                let _ = reader.await;
            }
            let exit_code = status.as_ref().ok().and_then(|s| s.code());
            registry.mark_exited(id, exit_code);
            let code_text = exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            events.enqueue(
                SystemEventKind::Exec,
                format!("Background process exited: {command} (exit code {code_text})"),
            );
            tracing::info!(session = %id, exit_code = ?exit_code, "background process exited");
        });
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
