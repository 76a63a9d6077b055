//! Embedder trait for text-to-vector conversion.
//!
//! Stores embed records on write and queries on search with the same
//! embedder, so both land in one vector space.

use async_trait::async_trait;
use crate::error::MemoryError;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed one or more texts. Returns one vector per input, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError>;

    /// The model name used for embeddings (e.g., "gemini-embedding-001").
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>, MemoryError> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        match vectors.len() {
            1 => Ok(vectors.remove(0)),
            n => Err(MemoryError::EmbeddingFailed(format!(
                "expected 1 embedding from '{}', got {n}",
                self.model_name()
            ))),
        }
    }
}
