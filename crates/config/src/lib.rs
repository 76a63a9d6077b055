//! Configuration loading, validation, and management for memochat.
//!
//! Loads configuration from `~/.memochat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Memory backends understood by the store factory.
pub const MEMORY_BACKENDS: &[&str] = &["sqlite", "file", "memory"];

/// Local providers that accept any bearer token.
pub const KEYLESS_PROVIDERS: &[&str] = &["ollama", "vllm", "llamacpp", "llama.cpp"];

/// The root configuration structure.
///
/// Maps directly to `~/.memochat/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default chat model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Interactive chat configuration
    #[serde(default)]
    pub chat: ChatConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "gemini".into()
}
fn default_model() -> String {
    "gemini-2.5-flash".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2048
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("memory", &self.memory)
            .field("chat", &self.chat)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// "sqlite", "file" or "memory"
    #[serde(default = "default_memory_backend")]
    pub backend: String,

    /// Where the store lives. Relative paths resolve against the working
    /// directory, so memories accumulate across runs started from it.
    #[serde(default = "default_memory_path")]
    pub path: PathBuf,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
}

fn default_memory_backend() -> String {
    "sqlite".into()
}
fn default_memory_path() -> PathBuf {
    PathBuf::from("./memochat_memory_db")
}
fn default_collection() -> String {
    "chat_history".into()
}
fn default_embedding_model() -> String {
    "gemini-embedding-001".into()
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: default_memory_backend(),
            path: default_memory_path(),
            collection: default_collection(),
            embedding_model: default_embedding_model(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Typing this (any case) ends the session
    #[serde(default = "default_exit_keyword")]
    pub exit_keyword: String,

    /// Echo the recalled context block after each reply
    #[serde(default)]
    pub show_recalled: bool,
}

fn default_exit_keyword() -> String {
    "exit".into()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            exit_keyword: default_exit_keyword(),
            show_recalled: false,
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.memochat/config.toml).
    ///
    /// When the file has no global key, the environment supplies one:
    /// the vendor variable of the default provider (`GEMINI_API_KEY` or
    /// `GOOGLE_API_KEY` for gemini, `OPENAI_API_KEY` for openai), then
    /// `MEMOCHAT_API_KEY`.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup function.
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Provider first: it decides which vendor key variable applies
        if let Some(provider) = lookup("MEMOCHAT_PROVIDER") {
            self.default_provider = provider;
        }

        if self.api_key.is_none() {
            self.api_key = vendor_key_vars(&self.default_provider)
                .iter()
                .copied()
                .find_map(&lookup)
                .or_else(|| lookup("MEMOCHAT_API_KEY"));
        }

        if let Some(model) = lookup("MEMOCHAT_MODEL") {
            self.default_model = model;
        }

        if let Some(path) = lookup("MEMOCHAT_MEMORY_PATH") {
            self.memory.path = PathBuf::from(path);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".memochat")
    }

    /// API key for a provider: its own entry first, then the global key.
    pub fn api_key_for(&self, provider: &str) -> Option<String> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_key.clone())
            .or_else(|| self.api_key.clone())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !MEMORY_BACKENDS.contains(&self.memory.backend.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "memory.backend must be one of {}, got '{}'",
                MEMORY_BACKENDS.join(", "),
                self.memory.backend
            )));
        }

        if self.memory.collection.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "memory.collection must not be empty".into(),
            ));
        }

        if self.chat.exit_keyword.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chat.exit_keyword must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key_for(&self.default_provider).is_some()
    }

    /// Whether the default provider needs a real API key.
    pub fn requires_api_key(&self) -> bool {
        !KEYLESS_PROVIDERS.contains(&self.default_provider.as_str())
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            memory: MemoryConfig::default(),
            chat: ChatConfig::default(),
            providers: HashMap::new(),
        }
    }
}

/// Vendor environment variables holding a key for `provider`.
fn vendor_key_vars(provider: &str) -> &'static [&'static str] {
    match provider {
        "gemini" | "google" => &["GEMINI_API_KEY", "GOOGLE_API_KEY"],
        "openai" => &["OPENAI_API_KEY"],
        "openrouter" => &["OPENROUTER_API_KEY"],
        _ => &[],
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
