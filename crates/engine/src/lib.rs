// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pa-engine: the gateway, the heartbeat scheduler, and the cron manager.
//!
//! The gateway's bounded queue is the single serialization point between
//! all producers (adapters, heartbeats, cron fires) and the agent: one
//! consumer loop drives one agent turn at a time, globally FIFO.

pub mod cron;
pub mod gateway;
pub mod heartbeat;

pub use self::cron::{
    next_run_at, ActionResponse, CronActionHandler, CronManager, MAX_TIMER_DELAY_MS,
};
pub use gateway::{Gateway, GatewayContext};
pub use heartbeat::{
    is_heartbeat_ok, resolve_prompt, start_heartbeat, HeartbeatHandle, HEARTBEAT_OK,
    HEARTBEAT_SOURCE,
};
