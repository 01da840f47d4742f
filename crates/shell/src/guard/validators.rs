// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command-specific validators for allowlisted-but-dangerous commands.

use super::Verdict;

/// PIDs below this are reserved for system processes and may not be killed.
pub const MIN_KILL_PID: u32 = 1000;

/// Run the extra validator registered for `name`, if any.
///
/// `args` are the tokens after the command name.
pub fn run_extra_validator(name: &str, args: &[String]) -> Verdict {
    match name {
        "rm" => validate_rm(args),
        "kill" | "pkill" => validate_kill(args),
        _ => Verdict::Allow,
    }
}

/// Reject `rm` invocations that could take out the filesystem root.
fn validate_rm(args: &[String]) -> Verdict {
    for arg in args.iter().filter(|a| !a.starts_with('-')) {
        if arg == "/" || arg == "/." || arg == "/*" {
            return Verdict::block(format!("refusing rm of filesystem root: {arg}"));
        }
        if is_root_level_wildcard(arg) {
            return Verdict::block(format!("refusing rm with wildcard at root: {arg}"));
        }
    }
    Verdict::Allow
}

/// A glob whose first real path component is directly under `/`.
fn is_root_level_wildcard(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('/') else {
        return false;
    };
    match rest.split('/').next() {
        Some(first) => first.contains('*') || first.contains('?'),
        None => false,
    }
}

/// `kill` arguments must be numeric PIDs above the reserved range.
///
/// Leading `-`-prefixed tokens are signal specs (`-9`, `-TERM`) and are
/// skipped.
fn validate_kill(args: &[String]) -> Verdict {
    for arg in args.iter().filter(|a| !a.starts_with('-')) {
        match arg.parse::<u32>() {
            Ok(pid) if pid >= MIN_KILL_PID => {}
            Ok(pid) => {
                return Verdict::block(format!(
                    "refusing to kill reserved pid {pid} (minimum {MIN_KILL_PID})"
                ));
            }
            Err(_) => {
                return Verdict::block(format!("kill target is not a numeric pid: {arg}"));
            }
        }
    }
    Verdict::Allow
}

#[cfg(test)]
#[path = "validators_tests.rs"]
mod tests;
