// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-security gate.
//!
//! [`classify`] decides whether a shell command may run. It is evaluated
//! before any spawn, returns a verdict rather than erroring, and never
//! panics: every failure mode is a [`Verdict::Block`] with a human-readable
//! reason.
//!
//! A command is split into segments (`;`, `&&`, `||`, `|`); one blocked
//! segment blocks the whole string. Within a segment, leading `VAR=value`
//! assignments and flag tokens are skipped and the first remaining token's
//! basename must be on the allowlist. Allowlisted names in the
//! extra-validation set get command-specific checks, and every extracted
//! path must resolve inside the permitted directory roots.

mod paths;
mod segments;
mod validators;

pub use paths::{extract_paths, validate_path, OpMode};
pub use segments::{basename, is_assignment, split_segments, tokenize};
pub use validators::MIN_KILL_PID;

use pa_core::config::SecurityConfig;

/// Outcome of classifying a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Block { reason: String },
}

impl Verdict {
    pub fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Classify a full command string against the security config.
pub fn classify(command: &str, security: &SecurityConfig) -> Verdict {
    let segments = split_segments(command);
    if segments.is_empty() {
        return Verdict::block("empty command");
    }

    for segment in &segments {
        let tokens = tokenize(segment);
        if tokens.iter().any(|t| t == "sudo") {
            return Verdict::block("sudo is not permitted");
        }
        if let Verdict::Block { reason } = classify_segment(&tokens, security) {
            return Verdict::Block { reason };
        }
    }
    Verdict::Allow
}

fn classify_segment(tokens: &[String], security: &SecurityConfig) -> Verdict {
    let Some(name_index) = tokens
        .iter()
        .position(|t| !is_assignment(t) && !t.starts_with('-'))
    else {
        // nothing but assignments/flags: nothing will execute
        return Verdict::Allow;
    };

    let name = basename(&tokens[name_index]);
    if !security.allowed_commands.iter().any(|c| c == name) {
        return Verdict::block(format!("command not allowed: {name}"));
    }

    if security
        .commands_needing_extra_validation
        .iter()
        .any(|c| c == name)
    {
        let verdict = validators::run_extra_validator(name, &tokens[name_index + 1..]);
        if !verdict.is_allow() {
            return verdict;
        }
    }

    for (path, mode) in extract_paths(tokens, name) {
        let verdict = validate_path(&path, mode, security);
        if !verdict.is_allow() {
            return verdict;
        }
    }

    Verdict::Allow
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
