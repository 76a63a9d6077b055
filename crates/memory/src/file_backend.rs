//! File-based store: append-only JSON-lines storage.
//!
//! Each line is one JSON-encoded [`MemoryRecord`], embedding included.
//! Records are loaded into memory when the store is opened, and every
//! upsert appends a single line before the record becomes searchable.
//!
//! Storage location: `<memory.path>/<collection>.jsonl`

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use async_trait::async_trait;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;
use memochat_core::memory::{MemoryRecord, MemoryStore};
use tokio::sync::RwLock;
use tracing::{debug, warn};
use crate::vector;

/// A file-backed vector store using JSONL (one JSON object per line).
pub struct FileStore {
    path: PathBuf,
    collection: String,
    embedder: Arc<dyn Embedder>,
    records: RwLock<Vec<MemoryRecord>>,
}

impl FileStore {
    /// Open the store for `collection` inside `dir`.
    ///
    /// If the file exists, records are loaded from it. Otherwise the store
    /// starts empty and the file is created on first write.
    pub fn open(
        dir: &Path,
        collection: impl Into<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MemoryError> {
        let collection = collection.into();
        let path = dir.join(format!("{collection}.jsonl"));
        let records = Self::load_from_disk(&path)?;
        debug!(path = %path.display(), count = records.len(), "File memory store loaded");

        Ok(Self {
            path,
            collection,
            embedder,
            records: RwLock::new(records),
        })
    }

    /// Location of the backing JSONL file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Result<Vec<MemoryRecord>, MemoryError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(MemoryError::Storage(format!(
                    "Failed to read memory file {}: {e}",
                    path.display()
                )));
            }
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<MemoryRecord>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted memory record");
                    None
                }
            })
            .collect())
    }

    fn append_line(&self, record: &MemoryRecord) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                MemoryError::Storage(format!("Failed to create memory directory: {e}"))
            })?;
        }

        let mut line = serde_json::to_string(record).map_err(|e| {
            MemoryError::Storage(format!("Failed to serialize memory record: {e}"))
        })?;
        line.push('\n');

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| MemoryError::Storage(format!("Failed to open memory file: {e}")))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| MemoryError::Storage(format!("Failed to write memory file: {e}")))
    }
}

#[async_trait]
impl MemoryStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn upsert(&self, text: &str) -> Result<MemoryRecord, MemoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        let mut records = self.records.write().await;
        vector::ensure_dimension(vector::existing_dimension(records.iter()), embedding.len())?;

        let record = MemoryRecord::new(&self.collection, text, embedding);
        self.append_line(&record)?;
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
