// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reply routing by source name.

use super::{ChatAdapter, ChatError};
use pa_core::AdapterMessage;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Dispatches outbound messages to the adapter whose name matches the
/// message's `source`. Never reorders or batches; an unknown source is a
/// logged no-op.
#[derive(Default)]
pub struct Router {
    adapters: RwLock<HashMap<String, Arc<dyn ChatAdapter>>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index an adapter under its name. A later adapter with the same name
    /// replaces the earlier one.
    pub fn register(&self, adapter: Arc<dyn ChatAdapter>) {
        let name = adapter.name().to_string();
        self.adapters.write().insert(name, adapter);
    }

    pub fn adapter(&self, name: &str) -> Option<Arc<dyn ChatAdapter>> {
        self.adapters.read().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.adapters.read().keys().cloned().collect()
    }

    /// Deliver a reply to its originating adapter.
    pub async fn send_response(&self, message: &AdapterMessage) -> Result<(), ChatError> {
        let adapter = self.adapter(&message.source);
        match adapter {
            Some(adapter) => adapter.send_response(message).await,
            None => {
                tracing::warn!(source = %message.source, "no adapter for outbound message");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
