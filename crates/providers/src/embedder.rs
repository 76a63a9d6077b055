//! Provider-backed [`Embedder`].

use std::sync::Arc;
use async_trait::async_trait;
use memochat_core::embedding::Embedder;
use memochat_core::error::MemoryError;
use memochat_core::provider::{EmbeddingRequest, Provider};
use tracing::debug;

/// Calls a provider's `/embeddings` endpoint with a fixed model.
pub struct ProviderEmbedder {
    provider: Arc<dyn Provider>,
    model: String,
}

impl ProviderEmbedder {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }
}

#[async_trait]
impl Embedder for ProviderEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .provider
            .embed(EmbeddingRequest {
                model: self.model.clone(),
                inputs: texts.to_vec(),
            })
            .await?;

        if response.embeddings.len() != texts.len() {
            return Err(MemoryError::EmbeddingFailed(format!(
                "requested {} embeddings from '{}', got {}",
                texts.len(),
                self.model,
                response.embeddings.len()
            )));
        }

        debug!(
            model = %self.model,
            count = texts.len(),
            dim = response.embeddings.first().map(Vec::len).unwrap_or(0),
            "Embedded texts"
        );

        Ok(response.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
