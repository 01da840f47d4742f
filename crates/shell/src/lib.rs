// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pa-shell: command-security gate, process registry, and shell executor.
//!
//! Every shell execution the agent requests goes through [`guard::classify`]
//! before anything is spawned. Background and yielded executions are tracked
//! in the [`ProcessRegistry`]; their exits surface as `exec` system events.

pub mod exec;
pub mod guard;
pub mod registry;

pub use exec::{ExecOptions, ExecResult, Executor};
pub use guard::{classify, Verdict};
pub use registry::{ProcessRegistry, ProcessSession, PROCESS_SESSION_TTL};
