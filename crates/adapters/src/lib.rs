// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! pa-adapters: external I/O surfaces.
//!
//! Chat transports (inbound messages, outbound replies), the agent-turn
//! contract, and the memory-index contract all live behind traits here so
//! the engine never touches a transport or model API directly.

pub mod agent;
pub mod chat;
pub mod memory;

pub use agent::{AgentError, AgentOptions, AgentRunner, ClaudeCliRunner, TurnOutcome};
pub use chat::{
    chunk_text, ChatAdapter, ChatError, HttpTelegramApi, OnMessage, Router, TelegramAdapter,
    TelegramApi, TelegramChat, TelegramIncoming, TelegramUpdate, TelegramUser,
    TELEGRAM_CHUNK_LIMIT,
};
pub use memory::{MemoryError, MemoryHit, MemoryIndex, NoopMemoryIndex};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use agent::{AgentCall, FakeAgentRunner};
#[cfg(any(test, feature = "test-support"))]
pub use chat::FakeChatAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use chat::FakeTelegramApi;
