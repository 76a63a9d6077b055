//! SQLite store with embeddings kept as BLOBs.
//!
//! One table, `memories`, holds every collection. Embeddings are stored as
//! little-endian `f32` bytes and ranked in process by cosine similarity.

use std::path::Path;
use std::sync::Arc;
use async_trait::async_trait;
use chrono::Utc;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;
use memochat_core::memory::{MemoryRecord, MemoryStore};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;
use tracing::{debug, info};
use crate::vector;

/// File name of the database inside the memory directory.
pub const DATABASE_FILE: &str = "memory.sqlite";

/// A SQLite-backed vector store scoped to one collection.
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
    embedder: Arc<dyn Embedder>,
    /// Serializes the dimension check with the insert that follows it.
    write_lock: Mutex<()>,
}

impl SqliteStore {
    /// Open (or create) `<dir>/memory.sqlite` and scope it to `collection`.
    pub async fn open(
        dir: &Path,
        collection: impl Into<String>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, MemoryError> {
        std::fs::create_dir_all(dir).map_err(|e| {
            MemoryError::Storage(format!("Failed to create memory directory: {e}"))
        })?;
        let path = dir.join(DATABASE_FILE);

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| MemoryError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self {
            pool,
            collection: collection.into(),
            embedder,
            write_lock: Mutex::new(()),
        };
        store.run_migrations().await?;
        info!(path = %path.display(), collection = %store.collection, "SQLite memory store initialized");
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), MemoryError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS memories (
                iid          INTEGER PRIMARY KEY AUTOINCREMENT,
                id           TEXT UNIQUE NOT NULL,
                collection   TEXT NOT NULL,
                content      TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                embedding    BLOB NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| MemoryError::MigrationFailed(format!("memories table: {e}")))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_memories_collection ON memories(collection, iid)")
            .execute(&self.pool)
            .await
            .map_err(|e| MemoryError::MigrationFailed(format!("collection index: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_record(row: &sqlx::sqlite::SqliteRow) -> Result<MemoryRecord, MemoryError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| MemoryError::QueryFailed(format!("id column: {e}")))?;
        let collection: String = row
            .try_get("collection")
            .map_err(|e| MemoryError::QueryFailed(format!("collection column: {e}")))?;
        let content: String = row
            .try_get("content")
            .map_err(|e| MemoryError::QueryFailed(format!("content column: {e}")))?;
        let created_at_str: String = row
            .try_get("created_at")
            .map_err(|e| MemoryError::QueryFailed(format!("created_at column: {e}")))?;
        let blob: Vec<u8> = row
            .try_get("embedding")
            .map_err(|e| MemoryError::QueryFailed(format!("embedding column: {e}")))?;

        let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(MemoryRecord {
            id,
            collection,
            content,
            created_at,
            embedding: blob_to_embedding(&blob),
        })
    }

    /// Dimension of the oldest record in this collection, if any.
    async fn stored_dimension(&self) -> Result<Option<usize>, MemoryError> {
        let row = sqlx::query(
            "SELECT length(embedding) AS bytes FROM memories WHERE collection = ?1 ORDER BY iid LIMIT 1",
        )
        .bind(&self.collection)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| MemoryError::QueryFailed(format!("dimension lookup: {e}")))?;

        row.map(|r| {
            r.try_get::<i64, _>("bytes")
                .map(|bytes| bytes as usize / 4)
                .map_err(|e| MemoryError::QueryFailed(format!("bytes column: {e}")))
        })
        .transpose()
    }
}

/// Serialize an embedding vector to little-endian bytes.
fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

#[async_trait]
impl MemoryStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn upsert(&self, text: &str) -> Result<MemoryRecord, MemoryError> {
        let embedding = self.embedder.embed_one(text).await?;
        let _guard = self.write_lock.lock().await;
        vector::ensure_dimension(self.stored_dimension().await?, embedding.len())?;

        let record = MemoryRecord::new(&self.collection, text, embedding);
        sqlx::query(
            r#"
            INSERT INTO memories (id, collection, content, created_at, embedding)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&record.id)
        .bind(&record.collection)
        .bind(&record.content)
        .bind(record.created_at.to_rfc3339())
        .bind(embedding_to_blob(&record.embedding))
        .execute(&self.pool)
        .await
        .map_err(|e| MemoryError::Storage(format!("INSERT failed: {e}")))?;

        debug!(id = %record.id, "Stored memory");
        Ok(record)
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        let query_embedding = self.embedder.embed_one(query).await?;

        let rows = sqlx::query("SELECT * FROM memories WHERE collection = ?1 ORDER BY iid")
            .bind(&self.collection)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| MemoryError::QueryFailed(format!("Vector scan: {e}")))?;

        let records = rows
            .iter()
            .map(Self::row_to_record)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(vector::rank_by_similarity(&records, &query_embedding, k)
            .into_iter()
            .map(|(_, r)| r.content.clone())
            .collect())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM memories WHERE collection = ?1")
            .bind(&self.collection)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| MemoryError::QueryFailed(format!("count: {e}")))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| MemoryError::QueryFailed(format!("count column: {e}")))?;
        Ok(count as usize)
    }
}
