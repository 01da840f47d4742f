// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pa-daemon (pad): the long-running assistant process.
//!
//! Wires the gateway, cron manager, heartbeat, executor substrate, and
//! adapters together, then runs the gateway loop until SIGTERM/SIGINT.

pub mod lifecycle;
pub mod logging;

pub use lifecycle::{run, DaemonError};
