// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telegram adapter.
//!
//! The adapter logic (echo drop, allowed-user gating, thread encoding,
//! chunked sends) sits over the [`TelegramApi`] trait; [`HttpTelegramApi`]
//! is the Bot-API long-poll transport. Threaded chats encode the thread
//! into `source_id` as `{chat}--{thread}` and mirror the parts into
//! metadata; replies reconstruct the destination from either.

use super::{chunk_text, ChatAdapter, ChatError, OnMessage};
use async_trait::async_trait;
use pa_core::message::METADATA_THREAD_ID;
use pa_core::AdapterMessage;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

/// Telegram's outbound message limit, in UTF-16 code units.
pub const TELEGRAM_CHUNK_LIMIT: usize = 4096;

/// Long-poll timeout passed to `getUpdates`.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Backoff after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

const METADATA_CHAT_ID: &str = "chatId";
const METADATA_USER_ID: &str = "userId";

/// One `getUpdates` result item, reduced to what the adapter consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramIncoming>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramIncoming {
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub message_thread_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

/// Transport surface the adapter drives.
#[async_trait]
pub trait TelegramApi: Send + Sync + 'static {
    /// Fetch updates after `offset`, long-polling up to `timeout_secs`.
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, ChatError>;

    /// Send one already-chunked message.
    async fn send_message(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
    ) -> Result<(), ChatError>;
}

/// The Telegram chat adapter.
pub struct TelegramAdapter<T: TelegramApi> {
    api: Arc<T>,
    allowed_user_ids: Arc<Vec<i64>>,
    on_message: OnMessage,
    poll_task: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl<T: TelegramApi> TelegramAdapter<T> {
    pub fn new(api: T, allowed_user_ids: Vec<i64>, on_message: OnMessage) -> Self {
        Self::new_shared(Arc::new(api), allowed_user_ids, on_message)
    }

    /// Construct over an already-shared transport (used by tests to keep a
    /// handle on the fake).
    pub fn new_shared(api: Arc<T>, allowed_user_ids: Vec<i64>, on_message: OnMessage) -> Self {
        Self {
            api,
            allowed_user_ids: Arc::new(allowed_user_ids),
            on_message,
            poll_task: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<T: TelegramApi> ChatAdapter for TelegramAdapter<T> {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<(), ChatError> {
        let api = Arc::clone(&self.api);
        let allowed = Arc::clone(&self.allowed_user_ids);
        let on_message = Arc::clone(&self.on_message);

        let task = tokio::spawn(async move {
            let mut offset = 0i64;
            loop {
                match api.get_updates(offset, POLL_TIMEOUT_SECS).await {
                    Ok(updates) => {
                        for update in updates {
                            offset = offset.max(update.update_id + 1);
                            if let Some(msg) = convert_update(update, &allowed) {
                                on_message(msg);
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "telegram poll failed, backing off");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                    }
                }
            }
        });
        *self.poll_task.lock() = Some(task);
        tracing::info!("telegram adapter started");
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChatError> {
        if let Some(task) = self.poll_task.lock().take() {
            task.abort();
        }
        tracing::info!("telegram adapter stopped");
        Ok(())
    }

    async fn send_response(&self, message: &AdapterMessage) -> Result<(), ChatError> {
        let (chat_id, thread_id) = destination(message)?;
        for chunk in chunk_text(&message.text, TELEGRAM_CHUNK_LIMIT) {
            if let Err(e) = self.api.send_message(chat_id, thread_id, &chunk).await {
                tracing::error!(chat_id, error = %e, "telegram send failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Convert an update into an [`AdapterMessage`], or drop it.
///
/// Drops: non-message updates, messages without text, bot echoes, and —
/// when `allowed` is non-empty — messages from users not on the list. A
/// missing user id never passes a non-empty allowlist.
fn convert_update(update: TelegramUpdate, allowed: &[i64]) -> Option<AdapterMessage> {
    let incoming = update.message?;
    let text = incoming.text?;

    if incoming.from.as_ref().is_some_and(|u| u.is_bot) {
        return None;
    }

    if !allowed.is_empty() {
        match incoming.from.as_ref() {
            Some(user) if allowed.contains(&user.id) => {}
            Some(user) => {
                tracing::warn!(user_id = user.id, "dropping message from unlisted user");
                return None;
            }
            None => {
                tracing::warn!("dropping message without a sender id");
                return None;
            }
        }
    }

    let chat_id = incoming.chat.id;
    let source_id = match incoming.message_thread_id {
        Some(thread) => format!("{chat_id}--{thread}"),
        None => chat_id.to_string(),
    };

    let mut msg = AdapterMessage::new("telegram", source_id, text)
        .with_metadata(METADATA_CHAT_ID, chat_id.to_string());
    if let Some(thread) = incoming.message_thread_id {
        msg = msg.with_metadata(METADATA_THREAD_ID, thread.to_string());
    }
    if let Some(user) = incoming.from.as_ref() {
        msg = msg.with_metadata(METADATA_USER_ID, user.id.to_string());
    }
    Some(msg)
}

/// Reconstruct `(chat, thread)` from metadata or by splitting `source_id`
/// on the first `--`.
fn destination(message: &AdapterMessage) -> Result<(i64, Option<i64>), ChatError> {
    let (chat_part, thread_part) = match message.source_id.split_once("--") {
        Some((chat, thread)) => (chat.to_string(), Some(thread.to_string())),
        None => (message.source_id.clone(), None),
    };

    let chat_text = message
        .metadata
        .get(METADATA_CHAT_ID)
        .cloned()
        .unwrap_or(chat_part);
    let chat_id = chat_text
        .parse::<i64>()
        .map_err(|_| ChatError::BadDestination(message.source_id.clone()))?;

    let thread_text = message
        .metadata
        .get(METADATA_THREAD_ID)
        .cloned()
        .or(thread_part);
    let thread_id = match thread_text {
        Some(t) if !t.is_empty() => Some(
            t.parse::<i64>()
                .map_err(|_| ChatError::BadDestination(message.source_id.clone()))?,
        ),
        _ => None,
    };

    Ok((chat_id, thread_id))
}

/// Bot-API transport over HTTPS long polling.
pub struct HttpTelegramApi {
    client: reqwest::Client,
    base: String,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    ok: bool,
    #[serde(default)]
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

impl HttpTelegramApi {
    pub fn new(bot_token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base: format!("https://api.telegram.org/bot{bot_token}"),
        }
    }

    fn unwrap_envelope<T>(envelope: ApiEnvelope<T>) -> Result<Option<T>, ChatError> {
        if envelope.ok {
            Ok(envelope.result)
        } else {
            Err(ChatError::Transport(
                envelope
                    .description
                    .unwrap_or_else(|| "telegram api error".to_string()),
            ))
        }
    }
}

#[async_trait]
impl TelegramApi for HttpTelegramApi {
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<TelegramUpdate>, ChatError> {
        let response = self
            .client
            .get(format!("{}/getUpdates", self.base))
            .query(&[("offset", offset), ("timeout", timeout_secs as i64)])
            .timeout(Duration::from_secs(timeout_secs + 10))
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        let envelope: ApiEnvelope<Vec<TelegramUpdate>> = response
            .json()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;
        Ok(Self::unwrap_envelope(envelope)?.unwrap_or_default())
    }

    async fn send_message(
        &self,
        chat_id: i64,
        thread_id: Option<i64>,
        text: &str,
    ) -> Result<(), ChatError> {
        let mut body = serde_json::json!({ "chat_id": chat_id, "text": text });
        if let Some(thread) = thread_id {
            body["message_thread_id"] = serde_json::json!(thread);
        }
        let response = self
            .client
            .post(format!("{}/sendMessage", self.base))
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::SendFailed(e.to_string()))?;
        let envelope: ApiEnvelope<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| ChatError::SendFailed(e.to_string()))?;
        Self::unwrap_envelope(envelope)?;
        Ok(())
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake_api::FakeTelegramApi;

#[cfg(any(test, feature = "test-support"))]
mod fake_api {
    use super::*;
    use std::collections::VecDeque;

    /// Scripted transport: each `get_updates` call pops one batch.
    #[derive(Default)]
    pub struct FakeTelegramApi {
        batches: Mutex<VecDeque<Vec<TelegramUpdate>>>,
        sent: Mutex<Vec<(i64, Option<i64>, String)>>,
    }

    impl FakeTelegramApi {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_batch(&self, batch: Vec<TelegramUpdate>) {
            self.batches.lock().push_back(batch);
        }

        /// Messages delivered through `send_message`, in order.
        pub fn sent(&self) -> Vec<(i64, Option<i64>, String)> {
            self.sent.lock().clone()
        }
    }

    #[async_trait]
    impl TelegramApi for FakeTelegramApi {
        async fn get_updates(
            &self,
            _offset: i64,
            _timeout_secs: u64,
        ) -> Result<Vec<TelegramUpdate>, ChatError> {
            let batch = self.batches.lock().pop_front();
            match batch {
                Some(batch) => Ok(batch),
                None => {
                    // mimic an idle long poll without spinning the test
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn send_message(
            &self,
            chat_id: i64,
            thread_id: Option<i64>,
            text: &str,
        ) -> Result<(), ChatError> {
            self.sent.lock().push((chat_id, thread_id, text.to_string()));
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "telegram_tests.rs"]
mod tests;
