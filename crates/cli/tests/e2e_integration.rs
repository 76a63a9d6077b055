//! End-to-end tests for the memochat conversation pipeline.
//!
//! These drive the full loop (recall, prompt, generate, persist, reply)
//! over in-memory I/O against the real stores, with a scripted generator
//! and a deterministic embedder standing in for the remote model.

use std::sync::{Arc, Mutex};

use memochat_agent::{ConversationLoop, FAREWELL, MemoryAgent, NO_MEMORY_SENTINEL, SEPARATOR};
use memochat_core::embedding::Embedder;
use memochat_core::error::{MemoryError, ProviderError};
use memochat_core::memory::MemoryStore;
use memochat_core::provider::Generator;
use memochat_memory::{FileStore, InMemoryStore, SqliteStore};

// ── Test collaborators ───────────────────────────────────────────────────

/// Bag-of-words embedder over a fixed vocabulary.
struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self {
            vocabulary: vec!["cats", "dogs", "rust", "tea", "coffee", "weather", "fact"],
        }
    }
}

#[async_trait::async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, MemoryError> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let words: Vec<&str> = lower
                    .split(|c: char| !c.is_alphanumeric())
                    .filter(|w| !w.is_empty())
                    .collect();
                self.vocabulary
                    .iter()
                    .map(|v| words.iter().filter(|w| *w == v).count() as f32)
                    .collect()
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Returns scripted replies in order and keeps every prompt it saw.
struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ProviderError::EmptyResponse("script exhausted".into()))
    }
}

async fn chat(
    store: Arc<dyn MemoryStore>,
    generator: Arc<ScriptedGenerator>,
    input: &str,
) -> (usize, String) {
    let agent = MemoryAgent::new(store, generator);
    let mut conversation = ConversationLoop::new(agent, input.as_bytes(), Vec::new());
    let turns = conversation.run().await.unwrap();
    let (_, output) = conversation.into_parts();
    (turns, String::from_utf8(output).unwrap())
}

fn embedder() -> Arc<dyn Embedder> {
    Arc::new(KeywordEmbedder::new())
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_turn_on_empty_store() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new("chat_history", embedder()));
    let generator = Arc::new(ScriptedGenerator::new(&["Hi! Nice to meet you."]));

    let (turns, output) = chat(store.clone(), generator.clone(), "hello\nexit\n").await;

    assert_eq!(turns, 1);
    assert!(generator.prompts()[0].contains(NO_MEMORY_SENTINEL));
    assert!(generator.prompts()[0].contains("hello"));
    assert_eq!(store.count().await.unwrap(), 1);
    assert_eq!(
        store.search("hello", 3).await.unwrap(),
        vec!["User: hello / AI: Hi! Nice to meet you."]
    );
    assert!(output.contains(&format!("AI: Hi! Nice to meet you.\n{SEPARATOR}\n")));
    assert!(output.ends_with(&format!("{FAREWELL}\n")));
}

#[tokio::test]
async fn recalls_most_similar_turn_first() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new("chat_history", embedder()));
    let generator = Arc::new(ScriptedGenerator::new(&[
        "Cats are lovely.",
        "Tea is calming.",
        "Rust is fast.",
        "You told me you like cats.",
    ]));

    chat(
        store.clone(),
        generator.clone(),
        "I love cats\nI drink tea\nI write rust\nwhat about cats?\nexit\n",
    )
    .await;

    let last_prompt = generator.prompts().pop().unwrap();
    let cats = last_prompt.find("User: I love cats").unwrap();
    let tea = last_prompt.find("User: I drink tea").unwrap();
    let rust = last_prompt.find("User: I write rust").unwrap();
    assert!(cats < tea);
    assert!(cats < rust);
    assert_eq!(store.count().await.unwrap(), 4);
}

#[tokio::test]
async fn recall_is_capped_at_three() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new("chat_history", embedder()));
    for i in 0..10 {
        store.upsert(&format!("User: fact {i} / AI: noted")).await.unwrap();
    }
    let generator = Arc::new(ScriptedGenerator::new(&["ok"]));

    chat(store.clone(), generator.clone(), "tell me a fact\n").await;

    assert_eq!(generator.prompts()[0].matches("User: fact").count(), 3);
    assert_eq!(store.count().await.unwrap(), 11);
}

#[tokio::test]
async fn repeated_input_stores_two_records() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new("chat_history", embedder()));
    let generator = Arc::new(ScriptedGenerator::new(&["Sunny.", "Still sunny."]));

    let (turns, _) = chat(store.clone(), generator, "weather?\nweather?\n").await;

    assert_eq!(turns, 2);
    assert_eq!(store.count().await.unwrap(), 2);
    let stored = store.search("weather", 3).await.unwrap();
    assert!(stored.contains(&"User: weather? / AI: Sunny.".to_string()));
    assert!(stored.contains(&"User: weather? / AI: Still sunny.".to_string()));
}

#[tokio::test]
async fn exit_only_session_leaves_store_untouched() {
    let store: Arc<dyn MemoryStore> = Arc::new(InMemoryStore::new("chat_history", embedder()));
    let generator = Arc::new(ScriptedGenerator::new(&[]));

    let (turns, _) = chat(store.clone(), generator.clone(), "EXIT\n").await;

    assert_eq!(turns, 0);
    assert!(generator.prompts().is_empty());
    assert_eq!(store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn file_memories_carry_over_between_sessions() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store: Arc<dyn MemoryStore> =
            Arc::new(FileStore::open(dir.path(), "chat_history", embedder()).unwrap());
        let generator = Arc::new(ScriptedGenerator::new(&["Dogs are loyal."]));
        chat(store, generator, "my favourite animal is dogs\nexit\n").await;
    }

    let store: Arc<dyn MemoryStore> =
        Arc::new(FileStore::open(dir.path(), "chat_history", embedder()).unwrap());
    let generator = Arc::new(ScriptedGenerator::new(&["You like dogs!"]));
    chat(store.clone(), generator.clone(), "which dogs do I like?\nexit\n").await;

    assert!(generator.prompts()[0].contains("User: my favourite animal is dogs / AI: Dogs are loyal."));
    assert_eq!(store.count().await.unwrap(), 2);
}

#[tokio::test]
async fn sqlite_memories_carry_over_between_sessions() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store: Arc<dyn MemoryStore> = Arc::new(
            SqliteStore::open(dir.path(), "chat_history", embedder()).await.unwrap(),
        );
        let generator = Arc::new(ScriptedGenerator::new(&["Coffee wakes you up."]));
        chat(store, generator, "I need coffee\n").await;
    }

    let store: Arc<dyn MemoryStore> = Arc::new(
        SqliteStore::open(dir.path(), "chat_history", embedder()).await.unwrap(),
    );
    let generator = Arc::new(ScriptedGenerator::new(&["Another coffee?"]));
    chat(store.clone(), generator.clone(), "coffee again\n").await;

    assert!(generator.prompts()[0].contains("User: I need coffee / AI: Coffee wakes you up."));
    assert_eq!(store.count().await.unwrap(), 2);
}
