//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/clozeforge/) and project (.clozeforge/)
//! level configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ai::ProviderConfig;
use crate::constants::{constraints, network, output, rounds};
use crate::types::{ConstraintSpec, ForgeError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Sentence generation constraints and round budget
    pub generation: GenerationConfig,

    /// LLM provider settings
    pub llm: LlmConfig,

    /// Vocabulary input settings
    pub vocabulary: VocabularyConfig,

    /// Output artifact settings
    pub output: OutputConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            generation: GenerationConfig::default(),
            llm: LlmConfig::default(),
            vocabulary: VocabularyConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `ForgeError` on validation failure.
    pub fn validate(&self) -> Result<()> {
        // Constraint bounds validate through the ConstraintSpec constructor.
        self.generation.constraint_spec(false)?;

        if self.generation.requested_count == 0 {
            return Err(ForgeError::Config(
                "generation.requested_count must be greater than 0".to_string(),
            ));
        }

        if self.generation.batch_size == 0 {
            return Err(ForgeError::Config(
                "generation.batch_size must be greater than 0".to_string(),
            ));
        }

        if self.generation.retry_budget == 0 {
            return Err(ForgeError::Config(
                "generation.retry_budget must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ForgeError::Config(format!(
                "llm.temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(ForgeError::Config(
                "llm.timeout_secs must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Generation Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Minimum words per sentence (inclusive)
    pub min_words: usize,

    /// Maximum words per sentence (inclusive)
    pub max_words: usize,

    /// Minimum cloze targets per sentence
    pub cloze_min: usize,

    /// Maximum cloze targets per sentence
    pub cloze_max: usize,

    /// Accepted sentences a run aims for
    pub requested_count: usize,

    /// Candidates requested per collaborator call
    pub batch_size: usize,

    /// Generation rounds before the run is exhausted
    pub retry_budget: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_words: constraints::DEFAULT_MIN_WORDS,
            max_words: constraints::DEFAULT_MAX_WORDS,
            cloze_min: constraints::DEFAULT_CLOZE_MIN,
            cloze_max: constraints::DEFAULT_CLOZE_MAX,
            requested_count: rounds::DEFAULT_REQUESTED_COUNT,
            batch_size: rounds::DEFAULT_BATCH_SIZE,
            retry_budget: rounds::DEFAULT_RETRY_BUDGET,
        }
    }
}

impl GenerationConfig {
    /// Build the validated constraint spec these settings describe.
    pub fn constraint_spec(&self, numerals_allowed: bool) -> Result<ConstraintSpec> {
        ConstraintSpec::new(
            self.min_words,
            self.max_words,
            self.cloze_min,
            self.cloze_max,
            numerals_allowed,
        )
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider type: "openai", "ollama"
    pub provider: String,

    /// Model name (provider-specific default when unset)
    pub model: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: f32,

    /// API base URL (for custom endpoints)
    pub api_base: Option<String>,

    /// Maximum tokens to generate
    pub max_tokens: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: None,
            timeout_secs: network::DEFAULT_TIMEOUT_SECS,
            temperature: 0.7,
            api_base: None,
            max_tokens: 2048,
        }
    }
}

impl LlmConfig {
    /// Build the provider configuration. API keys come from the
    /// environment, never from config files.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            provider: self.provider.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
            temperature: self.temperature,
            api_key: None,
            api_base: self.api_base.clone(),
            max_tokens: self.max_tokens,
        }
    }
}

// =============================================================================
// Vocabulary & Output Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VocabularyConfig {
    /// Path to the allowed-word list (JSON)
    pub path: Option<PathBuf>,

    /// Optional YAML hints file (word: pos overlays)
    pub hints: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Where the accepted-sentence artifact is written
    pub path: PathBuf,

    /// Also emit Anki `{{cN::...}}` markup per sentence
    pub anki_cloze: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(output::DEFAULT_OUTPUT_PATH),
            anki_cloze: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_bounds_fail_validation() {
        let mut config = Config::default();
        config.generation.min_words = 9;
        config.generation.max_words = 4;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_range_checked() {
        let mut config = Config::default();
        config.llm.temperature = 3.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_requested_count_rejected() {
        let mut config = Config::default();
        config.generation.requested_count = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_constraint_spec_built_from_generation() {
        let config = Config::default();
        let spec = config.generation.constraint_spec(true).unwrap();
        assert_eq!(spec.word_bounds(), 4..=7);
        assert!(spec.numerals_allowed());
    }

    #[test]
    fn test_provider_config_never_carries_file_keys() {
        let config = Config::default();
        assert!(config.llm.provider_config().api_key.is_none());
    }
}
