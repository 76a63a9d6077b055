//! Subcommand implementations.

pub mod chat;
pub mod memory;
pub mod onboard;

use std::sync::Arc;
use memochat_config::AppConfig;
use memochat_core::memory::MemoryStore;
use memochat_core::provider::Provider;
use memochat_memory::open_store;
use memochat_providers::{ProviderEmbedder, build_from_config};

/// Load the config file plus environment overrides.
pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// The configured default provider.
pub(crate) fn default_provider(config: &AppConfig) -> Result<Arc<dyn Provider>, Box<dyn std::error::Error>> {
    let router = build_from_config(config);
    Ok(router.default().ok_or("No default provider configured")?)
}

/// Open the configured store, embedding with the default provider.
pub(crate) async fn open_memory(
    config: &AppConfig,
    provider: Arc<dyn Provider>,
) -> Result<Arc<dyn MemoryStore>, Box<dyn std::error::Error>> {
    let embedder = Arc::new(ProviderEmbedder::new(provider, &config.memory.embedding_model));
    Ok(open_store(&config.memory, embedder).await?)
}

/// Print setup help when the default provider needs a key and has none.
pub(crate) fn require_api_key(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.has_api_key() || !config.requires_api_key() {
        return Ok(());
    }

    eprintln!();
    eprintln!("  ERROR: No API key configured for provider '{}'!", config.default_provider);
    eprintln!();
    eprintln!("  Set one of these environment variables:");
    eprintln!("    GEMINI_API_KEY    = '...'   (Google Gemini, the default)");
    eprintln!("    OPENAI_API_KEY    = 'sk-...'");
    eprintln!("    MEMOCHAT_API_KEY  = '...'   (generic)");
    eprintln!();
    eprintln!("  Or add it to your config file:");
    eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
    eprintln!();
    Err("No API key found. See above for setup instructions.".into())
}
