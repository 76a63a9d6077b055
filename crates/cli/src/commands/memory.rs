//! `memochat memory`: Memory inspection commands.

pub async fn stats() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let provider = super::default_provider(&config)?;
    let store = super::open_memory(&config, provider).await?;

    println!("Memory Statistics");
    println!("=================");
    println!("  Backend:     {}", store.name());
    println!("  Path:        {}", config.memory.path.display());
    println!("  Collection:  {}", config.memory.collection);
    println!("  Embeddings:  {}", config.memory.embedding_model);
    println!("  Records:     {}", store.count().await?);

    Ok(())
}

pub async fn search(query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    super::require_api_key(&config)?;
    let provider = super::default_provider(&config)?;
    let store = super::open_memory(&config, provider).await?;

    println!("Searching memories for: \"{query}\"");
    println!();

    let results = store.search(query, limit).await?;
    if results.is_empty() {
        println!("  No memories found.");
    } else {
        for (i, text) in results.iter().enumerate() {
            println!("  {:>2}. {text}", i + 1);
        }
    }

    Ok(())
}
