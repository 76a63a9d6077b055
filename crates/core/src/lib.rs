//! # memochat core
//!
//! Domain types, collaborator traits, and error definitions for memochat,
//! a chat agent with long-term vector memory.
//!
//! Every external collaborator (language model, embedding model, vector
//! store) is a trait here. Implementations live in their own crates.

pub mod error;
pub mod message;
pub mod provider;
pub mod embedding;
pub mod memory;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use message::{Message, Role};
pub use provider::{Generator, Provider, ProviderRequest, ProviderResponse};
pub use embedding::Embedder;
pub use memory::{MemoryRecord, MemoryStore};
