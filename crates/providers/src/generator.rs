//! Chat-completion backed [`Generator`].
//!
//! The finished prompt is sent as a single user message; the first choice's
//! text comes back unmodified.

use std::sync::Arc;
use async_trait::async_trait;
use memochat_core::error::ProviderError;
use memochat_core::message::Message;
use memochat_core::provider::{Generator, Provider, ProviderRequest};
use tracing::debug;

pub struct ChatGenerator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
}

impl ChatGenerator {
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
        }
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl Generator for ChatGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ProviderRequest {
            model: self.model.clone(),
            messages: vec![Message::user(prompt)],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self.provider.complete(request).await?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %response.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation complete"
            );
        }

        Ok(response.message.content)
    }
}
