//! `memochat chat`: Interactive chat with long-term memory.

use std::sync::Arc;
use memochat_agent::{ConversationLoop, MemoryAgent};
use memochat_providers::ChatGenerator;
use tokio::io::BufReader;
use tracing::info;

pub async fn run(show_recalled: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config)?;

    let provider = super::default_provider(&config)?;
    let store = super::open_memory(&config, provider.clone()).await?;
    let remembered = store.count().await?;
    let generator = Arc::new(
        ChatGenerator::new(provider, &config.default_model, config.default_temperature)
            .with_max_tokens(config.default_max_tokens),
    );

    println!("Starting chat with memory.");
    println!(
        "  Model: {}  |  Memory: {} ({} remembered)",
        config.default_model,
        config.memory.path.display(),
        remembered
    );
    println!("Type '{}' to quit.", config.chat.exit_keyword);
    println!();

    let agent = MemoryAgent::new(store, generator);
    let mut conversation = ConversationLoop::new(
        agent,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .with_exit_keyword(&config.chat.exit_keyword)
    .with_show_recalled(show_recalled || config.chat.show_recalled);

    let turns = conversation.run().await?;
    info!(turns, "Chat session ended");
    Ok(())
}
