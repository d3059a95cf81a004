//! LLM Provider Abstraction
//!
//! Defines the [`LlmProvider`] trait for the external generative
//! collaborator. Providers return the collaborator's *raw text* plus token
//! usage metrics — parsing is deliberately left to the validator, which
//! must see the untrusted payload unmodified.

mod ollama;
mod openai;

pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::network;
use crate::types::{ForgeError, Result};

// =============================================================================
// Response with Usage Metrics
// =============================================================================

/// Complete collaborator response: raw text plus usage metrics.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Raw completion text, untrusted and unparsed.
    pub text: String,
    /// Token usage metrics.
    pub usage: TokenUsage,
    /// Wall-clock round-trip time.
    pub timing: ResponseTiming,
    /// Provider and model info.
    pub metadata: ResponseMetadata,
}

/// Token usage metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    /// From an OpenAI-style usage block.
    pub fn from_openai(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            input_tokens: prompt_tokens,
            output_tokens: completion_tokens,
        }
    }

    /// From an Ollama-style usage block.
    pub fn from_ollama(prompt_eval_count: u32, eval_count: u32) -> Self {
        Self {
            input_tokens: prompt_eval_count,
            output_tokens: eval_count,
        }
    }
}

/// Response timing metrics.
#[derive(Debug, Clone, Default)]
pub struct ResponseTiming {
    pub total_ms: u64,
}

impl ResponseTiming {
    pub fn from_duration(duration: std::time::Duration) -> Self {
        Self {
            total_ms: duration.as_millis() as u64,
        }
    }
}

/// Response metadata.
#[derive(Debug, Clone, Default)]
pub struct ResponseMetadata {
    pub model: String,
    pub provider: String,
}

/// Shared provider type for concurrent batch invocations.
pub type SharedProvider = Arc<dyn LlmProvider + Send + Sync>;

// =============================================================================
// Provider Configuration
// =============================================================================

/// Configuration for LLM providers.
///
/// API keys are never serialized to output and are redacted in debug
/// output; providers hold them as `SecretString` at runtime.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,
    /// Model name (provider-specific)
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,
    /// API key — never serialized
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub api_base: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_base", &self.api_base)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

fn default_max_tokens() -> usize {
    2048
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_key: None,
            api_base: None,
            max_tokens: 2048,
        }
    }
}

// =============================================================================
// LLM Provider Trait
// =============================================================================

/// The external generative collaborator, reachable only through this
/// narrow interface. Output is untrusted in every way.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// One generation round-trip. Returns raw text and usage metrics.
    async fn generate(&self, prompt: &str) -> Result<LlmResponse>;

    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Model name currently in use.
    fn model(&self) -> &str;

    /// Check whether the provider is reachable.
    async fn health_check(&self) -> Result<bool>;
}

/// Create a shared provider from configuration.
pub fn create_provider(config: &ProviderConfig) -> Result<SharedProvider> {
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAiProvider::new(config.clone())?)),
        "ollama" => Ok(Arc::new(OllamaProvider::new(config.clone())?)),
        _ => Err(ForgeError::Config(format!(
            "Unknown provider: {}. Supported: openai, ollama",
            config.provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let config = ProviderConfig {
            provider: "telepathy".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            create_provider(&config),
            Err(ForgeError::Config(_))
        ));
    }
}
