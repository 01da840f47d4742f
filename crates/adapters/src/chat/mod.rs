// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chat adapters: named inbound/outbound transports.
//!
//! An adapter converts transport-native events into [`AdapterMessage`]s and
//! hands them to the gateway through its [`OnMessage`] callback; replies
//! come back through [`ChatAdapter::send_response`], dispatched by the
//! [`Router`] on the message's `source` name. Adapters drop their own (bot)
//! messages, encode thread membership into `source_id`, and chunk outbound
//! text to the transport's limit.

mod chunk;
mod router;
mod telegram;

pub use chunk::chunk_text;
pub use router::Router;
pub use telegram::{
    HttpTelegramApi, TelegramAdapter, TelegramApi, TelegramChat, TelegramIncoming,
    TelegramUpdate, TelegramUser, TELEGRAM_CHUNK_LIMIT,
};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeChatAdapter;
#[cfg(any(test, feature = "test-support"))]
pub use telegram::FakeTelegramApi;

use async_trait::async_trait;
use pa_core::AdapterMessage;
use std::sync::Arc;
use thiserror::Error;

/// Errors from chat transport operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("malformed destination: {0}")]
    BadDestination(String),
}

/// Callback adapters invoke for every inbound message.
///
/// In the daemon this is the gateway's `enqueue`; it never blocks.
pub type OnMessage = Arc<dyn Fn(AdapterMessage) + Send + Sync>;

/// A named inbound/outbound transport.
#[async_trait]
pub trait ChatAdapter: Send + Sync + 'static {
    /// Stable adapter name; doubles as the `source` of its messages.
    fn name(&self) -> &str;

    /// Begin producing inbound messages.
    async fn start(&self) -> Result<(), ChatError>;

    /// Stop producing; idempotent.
    async fn stop(&self) -> Result<(), ChatError>;

    /// Deliver an outbound reply to the conversation named by
    /// `message.source_id`.
    async fn send_response(&self, message: &AdapterMessage) -> Result<(), ChatError>;
}
