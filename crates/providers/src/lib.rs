//! LLM and embedding providers for memochat.
//!
//! All HTTP backends implement the `memochat_core::Provider` trait.
//! [`ChatGenerator`] and [`ProviderEmbedder`] narrow a provider down to the
//! two collaborators the conversation loop and the memory stores need.

pub mod embedder;
pub mod generator;
pub mod openai_compat;
pub mod router;

pub use embedder::ProviderEmbedder;
pub use generator::ChatGenerator;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{ProviderRouter, build_from_config};
