// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Memory-index contract.
//!
//! The vector/keyword index over the markdown memory files is an external
//! collaborator; the daemon only initializes it at startup, closes it on
//! shutdown, and exposes search to the agent. [`NoopMemoryIndex`] is the
//! default wiring when no backend is configured.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("memory backend error: {0}")]
    Backend(String),
}

/// One search result.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryHit {
    pub path: PathBuf,
    pub snippet: String,
    pub score: f32,
}

/// The memory search surface.
#[async_trait]
pub trait MemoryIndex: Send + Sync + 'static {
    async fn init(&self) -> Result<(), MemoryError>;

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<MemoryHit>, MemoryError>;

    async fn close(&self) -> Result<(), MemoryError>;
}

/// Index that remembers nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMemoryIndex;

#[async_trait]
impl MemoryIndex for NoopMemoryIndex {
    async fn init(&self) -> Result<(), MemoryError> {
        Ok(())
    }

    async fn search(&self, _query: &str, _limit: usize) -> Result<Vec<MemoryHit>, MemoryError> {
        Ok(Vec::new())
    }

    async fn close(&self) -> Result<(), MemoryError> {
        Ok(())
    }
}
