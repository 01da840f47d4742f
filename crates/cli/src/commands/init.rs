// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pa init`: bootstrap the config directory and workspace.
//!
//! Idempotent: an existing config file is left untouched, directories are
//! created only when missing, everything owner-only.

use anyhow::Context;
use pa_core::config::{Config, CONFIG_FILE_NAME};
use std::path::Path;

pub fn run(config_dir: &Path) -> anyhow::Result<()> {
    pa_storage::create_dir_private(config_dir)
        .with_context(|| format!("creating {}", config_dir.display()))?;

    let config_path = config_dir.join(CONFIG_FILE_NAME);
    if config_path.exists() {
        println!("config already present: {}", config_path.display());
    } else {
        let defaults = serde_json::to_string_pretty(&Config::default())?;
        std::fs::write(&config_path, defaults + "\n")
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("wrote default config: {}", config_path.display());
    }

    // load (expands ~) so the directories land in their real locations
    let config = Config::load(config_dir)?;
    for dir in [
        &config.security.workspace,
        &config.security.data_dir,
        &config.sessions_dir(),
    ] {
        pa_storage::create_dir_private(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
    }
    println!("workspace: {}", config.security.workspace.display());
    println!("data dir:  {}", config.security.data_dir.display());
    Ok(())
}
