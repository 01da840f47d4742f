// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording fake chat adapter for tests.

use super::{ChatAdapter, ChatError};
use async_trait::async_trait;
use pa_core::AdapterMessage;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Records every outbound send; can be told to fail sends.
#[derive(Clone)]
pub struct FakeChatAdapter {
    name: String,
    sent: Arc<Mutex<Vec<AdapterMessage>>>,
    started: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
    fail_sends: Arc<AtomicBool>,
}

impl FakeChatAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sent: Arc::new(Mutex::new(Vec::new())),
            started: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
            fail_sends: Arc::new(AtomicBool::new(false)),
        }
    }

    /// All messages delivered through `send_response`, in order.
    pub fn sent(&self) -> Vec<AdapterMessage> {
        self.sent.lock().clone()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Make every subsequent send fail.
    pub fn fail_sends(&self) {
        self.fail_sends.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ChatAdapter for FakeChatAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn start(&self) -> Result<(), ChatError> {
        self.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> Result<(), ChatError> {
        self.stopped.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn send_response(&self, message: &AdapterMessage) -> Result<(), ChatError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(ChatError::SendFailed("fake send failure".to_string()));
        }
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
