//! memochat CLI: the main entry point.
//!
//! Commands:
//! - `chat`          : Interactive chat with long-term memory (default)
//! - `memory stats`  : Show where memories live and how many there are
//! - `memory search` : Similarity search over stored memories
//! - `onboard`       : Write a default config file

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "memochat",
    about = "memochat: a chat agent that remembers past conversations",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively (the default when no command is given)
    Chat {
        /// Print the recalled memories after each reply
        #[arg(long)]
        show_recalled: bool,
    },

    /// Inspect the memory store
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Write a default configuration file
    Onboard,
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Show backend, location and record count
    Stats,

    /// Search memories by similarity
    Search {
        /// Text to search for
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so they never mix with the conversation on stdout
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Chat { show_recalled: false }) {
        Commands::Chat { show_recalled } => commands::chat::run(show_recalled).await?,
        Commands::Memory { action } => match action {
            MemoryAction::Stats => commands::memory::stats().await?,
            MemoryAction::Search { query, limit } => commands::memory::search(&query, limit).await?,
        },
        Commands::Onboard => commands::onboard::run().await?,
    }

    Ok(())
}
