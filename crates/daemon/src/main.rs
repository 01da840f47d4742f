// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! pad: the assistant daemon binary.
//!
//! Normally started through `pa daemon`; running `pad` directly is
//! equivalent. The config directory comes from `--config <path>` or the
//! `PA_CONFIG` environment variable.

use pa_core::config::resolve_config_dir;
use std::path::PathBuf;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let mut config_flag: Option<PathBuf> = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => match args.next() {
                Some(path) => config_flag = Some(PathBuf::from(path)),
                None => {
                    eprintln!("error: --config requires a path");
                    return ExitCode::FAILURE;
                }
            },
            "--help" | "-h" => {
                println!("pad - personal assistant daemon");
                println!();
                println!("USAGE:");
                println!("    pad [--config <path>]");
                println!();
                println!("The daemon is typically started by `pa daemon`.");
                return ExitCode::SUCCESS;
            }
            "--version" | "-V" => {
                println!("pad {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                return ExitCode::FAILURE;
            }
        }
    }

    let config_dir = resolve_config_dir(config_flag);
    match pa_daemon::run(config_dir).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pad failed: {e}");
            ExitCode::FAILURE
        }
    }
}
