// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Path extraction and containment checks for the command gate.
//!
//! Two classes of arguments are inspected: path arguments of file-operation
//! commands (validated for write access) and path-shaped arguments of
//! reading commands (validated for read access). Redirect targets are
//! writes. Validation resolves symlinks: a path is compared by its
//! canonical location, never by textual prefix alone.

use super::segments::is_assignment;
use super::Verdict;
use pa_core::config::{expand_tilde, SecurityConfig};
use std::path::{Path, PathBuf};

/// Commands whose path arguments mutate the filesystem.
const WRITE_COMMANDS: &[&str] = &["cp", "mv", "rm", "mkdir", "touch", "tee", "ln"];

/// Commands whose path-shaped arguments are read.
const READ_COMMANDS: &[&str] = &[
    "cat", "grep", "head", "tail", "less", "more", "wc", "sort", "uniq", "cut", "tr", "diff",
    "ls", "find", "sed", "awk", "file", "stat",
];

/// Access mode a path is inspected under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpMode {
    Read,
    Write,
}

/// Collect the paths a segment would touch, with their access mode.
pub fn extract_paths(tokens: &[String], command_name: &str) -> Vec<(String, OpMode)> {
    let mut paths = Vec::new();
    let mut expect_redirect_target = false;

    for token in tokens {
        if expect_redirect_target {
            paths.push((token.clone(), OpMode::Write));
            expect_redirect_target = false;
            continue;
        }
        if token == ">" || token == ">>" {
            expect_redirect_target = true;
            continue;
        }
        if let Some(target) = token.strip_prefix(">>").or_else(|| token.strip_prefix('>')) {
            if !target.is_empty() {
                paths.push((target.to_string(), OpMode::Write));
            } else {
                expect_redirect_target = true;
            }
            continue;
        }
    }

    let args = command_args(tokens);
    if WRITE_COMMANDS.contains(&command_name) {
        for arg in args {
            paths.push((arg.clone(), OpMode::Write));
        }
    } else if READ_COMMANDS.contains(&command_name) {
        for arg in args {
            if is_path_shaped(arg) {
                paths.push((arg.clone(), OpMode::Read));
            }
        }
    }

    paths
}

/// Arguments after the command name, minus assignments, flags, and redirects.
fn command_args(tokens: &[String]) -> impl Iterator<Item = &String> {
    let mut seen_command = false;
    tokens
        .iter()
        .filter(move |t| {
            if !seen_command {
                if is_assignment(t) || t.starts_with('-') {
                    return false;
                }
                seen_command = true;
                return false; // the command name itself
            }
            true
        })
        .filter(|t| !t.starts_with('-') && !t.starts_with('>'))
}

/// Heuristic for arguments that name a filesystem location.
fn is_path_shaped(token: &str) -> bool {
    token.starts_with('/')
        || token.starts_with('~')
        || token.starts_with("./")
        || token.starts_with("../")
        || token.contains('/')
}

/// Check one extracted path against the permitted directory roots.
///
/// Relative paths resolve against the workspace root. The path (or its
/// nearest existing ancestor) is canonicalized so symlink escapes are
/// caught.
pub fn validate_path(raw: &str, mode: OpMode, security: &SecurityConfig) -> Verdict {
    let expanded = expand_tilde(Path::new(raw));
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        security.workspace.join(expanded)
    };
    let resolved = resolve_existing_prefix(&absolute);

    let mut roots: Vec<&PathBuf> = vec![&security.workspace];
    roots.extend(security.additional_write_dirs.iter());
    if mode == OpMode::Read {
        roots.extend(security.additional_read_dirs.iter());
    }

    for root in roots {
        let canonical_root = resolve_existing_prefix(root);
        if resolved.starts_with(&canonical_root) {
            return Verdict::Allow;
        }
    }

    Verdict::block(format!("path outside permitted directories: {raw}"))
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
///
/// A brand-new file under the workspace must validate even though it does
/// not exist yet, while a symlinked directory anywhere in the prefix still
/// resolves to its real location.
fn resolve_existing_prefix(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut suffix = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            let mut resolved = canonical;
            for part in suffix.iter().rev() {
                resolved.push(part);
            }
            return resolved;
        }
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                suffix.push(name.to_os_string());
                existing = parent;
            }
            _ => return path.to_path_buf(),
        }
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
