// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cron: next-fire computation, the action handler, and the manager that
//! owns the single armed deadline.

mod handler;
mod manager;
mod next_run;

pub use handler::{ActionResponse, CronActionHandler};
pub use manager::CronManager;
pub use next_run::{next_run_at, MAX_TIMER_DELAY_MS};
