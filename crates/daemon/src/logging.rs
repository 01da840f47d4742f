// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Logging setup for the daemon.
//!
//! Structured `tracing` records go to `{dataDir}/pad.log` through a
//! non-blocking appender. `PA_LOG` (env-filter syntax) controls verbosity;
//! the default is `info`. Credentials never reach the log: config is only
//! logged through `pa_core::redact`.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Env var holding the log filter (e.g. `debug`, `pa_engine=trace`).
pub const LOG_ENV_VAR: &str = "PA_LOG";

/// Initialize file logging for the daemon. The returned guard must stay
/// alive for the process lifetime or buffered records are lost.
pub fn init_daemon(data_dir: &Path) -> Result<WorkerGuard, std::io::Error> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("pad.log"))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .finish();
    // a second init (tests, terminal mode) keeps the existing subscriber
    let _ = tracing::subscriber::set_global_default(subscriber);
    Ok(guard)
}

/// Initialize stderr logging for interactive commands.
pub fn init_stderr() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
