//! Persistent Engine Capabilities
//!
//! The gateway talks to any backing engine through these two traits, so a
//! file-backed store, an in-memory one, or a test double are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

/// Stored payload. The gateway assumes no structure beyond valid JSON.
pub type Item = serde_json::Value;

// == Engine Error ==
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Corrupt store file: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

// == Table ==
/// One named partition of the persistent store.
#[async_trait]
pub trait Table: Send + Sync {
    fn name(&self) -> &str;

    async fn has(&self, item_id: &str) -> Result<bool, EngineError>;

    async fn get(&self, item_id: &str) -> Result<Option<Item>, EngineError>;

    /// Stores `value` and returns it as the engine now holds it.
    async fn set(&self, item_id: &str, value: Item) -> Result<Item, EngineError>;
}

// == Engine ==
/// Hands out table handles. Opening the same table twice must yield handles
/// over the same data.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn open_table(&self, table_id: &str) -> Result<Arc<dyn Table>, EngineError>;
}
