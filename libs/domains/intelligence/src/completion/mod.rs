//! Text completion backends.

mod anthropic;

pub use anthropic::AnthropicProvider;

use async_trait::async_trait;
use core_config::{ConfigError, FromEnv, env_optional, env_or_default, env_parse_or_default};
use std::time::Duration;

use crate::error::IntelligenceResult;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Single-shot text completion: one system instruction, one user prompt,
/// one text reply.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Whether credentials are present. No network call is made.
    fn is_configured(&self) -> bool;

    /// Returns the reply text.
    ///
    /// Fails with [`NotConfigured`](crate::IntelligenceError::NotConfigured)
    /// before any I/O when credentials are missing.
    async fn complete(&self, system: &str, prompt: &str) -> IntelligenceResult<String>;
}

/// Anthropic Messages API settings
#[derive(Clone, PartialEq)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl CompletionConfig {
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl FromEnv for CompletionConfig {
    /// - `ANTHROPIC_API_KEY` (optional; blank counts as unset)
    /// - `ANTHROPIC_BASE_URL` (default `https://api.anthropic.com`)
    /// - `CLAUDE_MODEL` (default `claude-sonnet-4-20250514`)
    /// - `CLAUDE_MAX_TOKENS` (default 4096)
    /// - `ANTHROPIC_TIMEOUT_SECS` (default 120)
    fn from_env() -> Result<Self, ConfigError> {
        let max_tokens = env_parse_or_default("CLAUDE_MAX_TOKENS", DEFAULT_MAX_TOKENS)?;
        let timeout_secs = env_parse_or_default("ANTHROPIC_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

        Ok(Self::new(env_optional("ANTHROPIC_API_KEY"))
            .with_base_url(env_or_default("ANTHROPIC_BASE_URL", DEFAULT_BASE_URL))
            .with_model(env_or_default("CLAUDE_MODEL", DEFAULT_MODEL))
            .with_max_tokens(max_tokens)
            .with_timeout(Duration::from_secs(timeout_secs)))
    }
}
