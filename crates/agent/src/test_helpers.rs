//! Shared test helpers for agent tests.

use std::sync::Mutex;
use memochat_core::error::{MemoryError, ProviderError};
use memochat_core::memory::{MemoryRecord, MemoryStore};
use memochat_core::provider::Generator;

/// A generator that returns scripted replies in order and records prompts.
pub struct ScriptedGenerator {
    replies: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl ScriptedGenerator {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().rev().map(|r| r.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A generator whose every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if self.fail {
            return Err(ProviderError::Network("connection refused".into()));
        }
        self.replies
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| ProviderError::EmptyResponse("script exhausted".into()))
    }
}

/// A store that keeps texts in a Vec. `search` returns the newest `k`
/// texts, newest first, and every call is recorded.
pub struct RecordingStore {
    texts: Mutex<Vec<String>>,
    searches: Mutex<Vec<(String, usize)>>,
    fail_search: bool,
    fail_upsert: bool,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self {
            texts: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            fail_search: false,
            fail_upsert: false,
        }
    }

    pub fn with_texts(texts: &[&str]) -> Self {
        let store = Self::new();
        *store.texts.lock().unwrap() = texts.iter().map(|t| t.to_string()).collect();
        store
    }

    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::new()
        }
    }

    pub fn failing_upsert() -> Self {
        Self {
            fail_upsert: true,
            ..Self::new()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl MemoryStore for RecordingStore {
    fn name(&self) -> &str {
        "recording"
    }

    async fn upsert(&self, text: &str) -> Result<MemoryRecord, MemoryError> {
        if self.fail_upsert {
            return Err(MemoryError::Storage("disk full".into()));
        }
        self.texts.lock().unwrap().push(text.to_string());
        Ok(MemoryRecord::new("test", text, vec![1.0]))
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, MemoryError> {
        self.searches.lock().unwrap().push((query.to_string(), k));
        if self.fail_search {
            return Err(MemoryError::EmbeddingFailed("quota exceeded".into()));
        }
        Ok(self.texts.lock().unwrap().iter().rev().take(k).cloned().collect())
    }

    async fn count(&self) -> Result<usize, MemoryError> {
        Ok(self.texts.lock().unwrap().len())
    }
}
