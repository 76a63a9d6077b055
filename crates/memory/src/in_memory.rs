//! In-memory store: useful for testing and ephemeral sessions.

use std::sync::Arc;
use async_trait::async_trait;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;
use memochat_core::memory::{MemoryRecord, MemoryStore};
use tokio::sync::RwLock;
use crate::vector;

/// A vector store that keeps records in a Vec for the life of the process.
pub struct InMemoryStore {
    collection: String,
    embedder: Arc<dyn Embedder>,
    records: RwLock<Vec<MemoryRecord>>,
}

impl InMemoryStore {
    pub fn new(collection: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            collection: collection.into(),
            embedder,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Snapshot of every record, oldest first.
    pub async fn records(&self) -> Vec<MemoryRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl MemoryStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn upsert(&self, text: &str) -> Result<MemoryRecord, MemoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        let mut records = self.records.write().await;
        vector::ensure_dimension(vector::existing_dimension(records.iter()), embedding.len())?;

        let record = MemoryRecord::new(&self.collection, text, embedding);
        records.push(record.clone());
        Ok(record)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        let query_embedding = self.embedder.embed_one(query).await?;
        let records = self.records.read().await;
        Ok(vector::rank_by_similarity(records.iter(), &query_embedding, k)
            .into_iter()
            .map(|(_, r)| r.content.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.records.read().await.len())
    }
}
