// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pa: the assistant CLI.
//!
//! Three subcommands: `init` bootstraps the config directory and
//! workspace, `terminal` is an interactive session against the same
//! gateway the daemon runs, and `daemon` runs the daemon in the
//! foreground. The config directory resolves as `--config` > `PA_CONFIG`
//! > `~/.pa`.

mod commands;

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use pa_core::config::resolve_config_dir;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pa", version, about = "personal assistant daemon and tools")]
struct Cli {
    /// Config directory (overrides PA_CONFIG)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the default config and workspace
    Init,
    /// Interactive terminal session
    Terminal,
    /// Run the daemon in the foreground
    Daemon,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    let config_dir = resolve_config_dir(cli.config);
    let result = match cli.command {
        Commands::Init => commands::init::run(&config_dir),
        Commands::Terminal => {
            pa_daemon::logging::init_stderr();
            commands::terminal::run(&config_dir).await
        }
        Commands::Daemon => pa_daemon::run(config_dir)
            .await
            .map_err(anyhow::Error::from),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
