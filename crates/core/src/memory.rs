//! Memory trait: persistent conversation memory with similarity search.
//!
//! The store is append-only from the agent's point of view: every turn
//! becomes one new [`MemoryRecord`], and records are never edited or deleted.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use crate::error::MemoryError;

/// A single persisted memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID for this memory
    pub id: String,

    /// Logical collection the record belongs to (e.g. "chat_history")
    pub collection: String,

    /// The stored text (a serialized turn)
    pub content: String,

    /// When this memory was written
    pub created_at: DateTime<Utc>,

    /// Embedding computed at write time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,
}

impl MemoryRecord {
    /// Create a fresh record with a generated id and the current timestamp.
    pub fn new(collection: impl Into<String>, content: impl Into<String>, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            collection: collection.into(),
            content: content.into(),
            created_at: Utc::now(),
            embedding,
        }
    }
}

/// The vector memory store.
///
/// Implementations: in-memory (for testing), JSONL file, SQLite.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "file", "memory").
    fn name(&self) -> &str;

    /// Embed `text` and append it as a new record.
    ///
    /// Always an append: identical text written twice yields two records.
    async fn upsert(&self, text: &str) -> Result<MemoryRecord, MemoryError>;

    /// Return up to `k` stored texts, most similar to `query` first.
    ///
    /// Must not mutate the store.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError>;

    /// Total number of records in the store.
    async fn count(&self) -> Result<usize, MemoryError>;
}
