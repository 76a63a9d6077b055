//! Shared test helpers for store tests.

use async_trait::async_trait;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;

/// Deterministic embedder: one dimension per vocabulary word, valued by
/// how often the word occurs (case-insensitive). Unknown words are ignored.
pub struct KeywordEmbedder {
    vocabulary: Vec<String>,
}

impl KeywordEmbedder {
    pub fn new(vocabulary: &[&str]) -> Self {
        Self {
            vocabulary: vocabulary.iter().map(|w| w.to_lowercase()).collect(),
        }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        self.vocabulary
            .iter()
            .map(|v| words.iter().filter(|w| *w == v).count() as f32)
            .collect()
    }
}

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Embedder that always fails, as if the embedding service were unreachable.
pub struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Err(MemoryError::EmbeddingFailed("embedding service unreachable".into()))
    }

    fn model_name(&self) -> &str {
        "unreachable"
    }
}
