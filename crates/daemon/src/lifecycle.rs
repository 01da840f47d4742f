// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle: startup wiring, signal handling, shutdown ordering.
//!
//! Startup (strict order): load config; create workspace/data directories
//! owner-only; initialize the memory index; build agent options; construct
//! the system-event queue, cron manager, heartbeat, gateway, and router;
//! start enabled adapters with the gateway's `enqueue` as their inbound
//! callback; register them; arm the heartbeat; re-arm the cron timer; run
//! the gateway loop.
//!
//! Shutdown on SIGTERM/SIGINT: arm a 10 s force-exit watchdog, stop the
//! gateway (current turn finishes), stop adapters (errors collected, not
//! propagated), stop the heartbeat, disarm cron, close memory, clear the
//! watchdog. A second signal during shutdown is logged and ignored.

use crate::logging;
use fs2::FileExt;
use pa_adapters::{
    AgentOptions, ChatAdapter, ClaudeCliRunner, HttpTelegramApi, MemoryIndex, NoopMemoryIndex,
    OnMessage, Router, TelegramAdapter,
};
use pa_core::{redacted_json, Config, ConfigError, SystemEventQueue};
use pa_engine::{start_heartbeat, CronManager, Gateway, GatewayContext};
use pa_storage::{AuditLog, CronStore, StorageError, TranscriptStore};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{error, info, warn};

/// Cooperative-shutdown budget before the watchdog force-exits.
const SHUTDOWN_WATCHDOG: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("another daemon is already running (lock: {0})")]
    AlreadyRunning(PathBuf),
    #[error("adapter failed to start: {0}")]
    Adapter(String),
    #[error("memory index failed: {0}")]
    Memory(String),
}

/// Run the daemon until a termination signal. This is the entry point for
/// both the `pad` binary and `pa daemon`.
pub async fn run(config_dir: PathBuf) -> Result<(), DaemonError> {
    let config = Config::load(&config_dir)?;

    // workspace/data directories, owner-only
    pa_storage::create_dir_private(&config.security.workspace)?;
    pa_storage::create_dir_private(&config.security.data_dir)?;
    pa_storage::create_dir_private(&config.sessions_dir())?;

    let _log_guard = logging::init_daemon(&config.security.data_dir)?;
    info!(config = %redacted_json(&config), "starting pad");

    // single instance
    let lock_path = config.security.data_dir.join("pad.pid");
    let _lock_file = acquire_lock(&lock_path)?;

    // memory index (external collaborator; noop wiring by default)
    let memory: Arc<dyn MemoryIndex> = Arc::new(NoopMemoryIndex);
    memory
        .init()
        .await
        .map_err(|e| DaemonError::Memory(e.to_string()))?;

    // agent options
    let agent_options = AgentOptions {
        model: config.agent.model.clone(),
        max_turns: config.agent.max_turns,
        workspace: config.security.workspace.clone(),
    };

    // shared services
    let events = Arc::new(SystemEventQueue::new());
    let gateway = Gateway::new(config.gateway.max_queue_size);
    let router = Arc::new(Router::new());
    let cron = CronManager::new(CronStore::new(config.cron_store_path()), Arc::clone(&events));

    // adapters feed the gateway
    let mut adapters: Vec<Arc<dyn ChatAdapter>> = Vec::new();
    if config.adapters.telegram.enabled {
        let enqueue: OnMessage = {
            let gateway = Arc::clone(&gateway);
            Arc::new(move |msg| gateway.enqueue(msg))
        };
        let api = HttpTelegramApi::new(&config.adapters.telegram.bot_token);
        let adapter: Arc<dyn ChatAdapter> = Arc::new(TelegramAdapter::new(
            api,
            config.adapters.telegram.allowed_user_ids.clone(),
            enqueue,
        ));
        adapter
            .start()
            .await
            .map_err(|e| DaemonError::Adapter(e.to_string()))?;
        router.register(Arc::clone(&adapter));
        adapters.push(adapter);
        info!("telegram adapter running");
    }
    if config.adapters.slack.enabled {
        warn!("slack is enabled in config but this build carries no socket-mode transport; ignoring");
    }

    // heartbeat feeds the gateway too
    let mut heartbeat = {
        let gateway = Arc::clone(&gateway);
        start_heartbeat(&config.heartbeat, Arc::clone(&events), move |msg| {
            gateway.enqueue(msg)
        })
    };

    cron.rearm_timer();

    // gateway loop
    let ctx = GatewayContext {
        agent: Arc::new(ClaudeCliRunner::new()),
        agent_options,
        router: Arc::clone(&router),
        transcripts: Arc::new(TranscriptStore::new()),
        sessions_dir: config.sessions_dir(),
        audit: Some(AuditLog::new(config.security.workspace.clone())),
        session: config.session.clone(),
    };
    let loop_task = {
        let gateway = Arc::clone(&gateway);
        tokio::spawn(async move { gateway.process_loop(ctx).await })
    };

    info!("pad ready");
    let (sigterm, sigint) = wait_for_shutdown_signal().await?;

    // --- shutdown ---
    let watchdog = tokio::spawn(async {
        tokio::time::sleep(SHUTDOWN_WATCHDOG).await;
        error!("shutdown watchdog expired, forcing exit");
        std::process::exit(1);
    });
    ignore_further_signals(sigterm, sigint);

    gateway.stop();
    for adapter in &adapters {
        if let Err(e) = adapter.stop().await {
            warn!(adapter = adapter.name(), error = %e, "adapter stop failed");
        }
    }
    heartbeat.stop();
    cron.stop();
    if let Err(e) = memory.close().await {
        warn!(error = %e, "memory close failed");
    }
    if let Err(e) = loop_task.await {
        if !e.is_cancelled() {
            warn!(error = %e, "gateway loop join failed");
        }
    }
    watchdog.abort();
    let _ = std::fs::remove_file(&lock_path);
    info!("pad stopped");
    Ok(())
}

/// Take the exclusive pid-file lock, writing our pid into it.
fn acquire_lock(path: &Path) -> Result<File, DaemonError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)?;
    if file.try_lock_exclusive().is_err() {
        return Err(DaemonError::AlreadyRunning(path.to_path_buf()));
    }
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())?;
    Ok(file)
}

/// Block until the first SIGTERM/SIGINT; hand back the streams so later
/// signals can be drained and ignored.
async fn wait_for_shutdown_signal() -> Result<(Signal, Signal), DaemonError> {
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }
    Ok((sigterm, sigint))
}

fn ignore_further_signals(mut sigterm: Signal, mut sigint: Signal) {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = sigterm.recv() => warn!("already shutting down, signal ignored"),
                _ = sigint.recv() => warn!("already shutting down, signal ignored"),
            }
        }
    });
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
