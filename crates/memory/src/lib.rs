//! Vector memory stores for memochat.

pub mod in_memory;
pub mod file_backend;
pub mod vector;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use in_memory::InMemoryStore;
pub use file_backend::FileStore;
pub use vector::{cosine_similarity, rank_by_similarity};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::sync::Arc;
use memochat_config::MemoryConfig;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;
use memochat_core::memory::MemoryStore;
use tracing::info;

/// Open the store selected by `config.backend`.
pub async fn open_store(
    config: &MemoryConfig,
    embedder: Arc<dyn Embedder>,
) -> Result<Arc<dyn MemoryStore>, MemoryError> {
    let store: Arc<dyn MemoryStore> = match config.backend.as_str() {
        "memory" => Arc::new(InMemoryStore::new(&config.collection, embedder)),
        "file" => Arc::new(FileStore::open(&config.path, &config.collection, embedder)?),
        #[cfg(feature = "sqlite")]
        "sqlite" => Arc::new(SqliteStore::open(&config.path, &config.collection, embedder).await?),
        other => {
            return Err(MemoryError::Storage(format!(
                "Unsupported memory backend '{other}'"
            )));
        }
    };

    info!(
        backend = store.name(),
        path = %config.path.display(),
        collection = %config.collection,
        "Memory store opened"
    );
    Ok(store)
}
