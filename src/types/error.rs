//! Unified Error Type System
//!
//! Centralized error types for the entire engine.
//!
//! ## Error Classes
//!
//! - **Fatal**: `EmptyVocabulary`, `InvalidConstraint` — reported before any
//!   collaborator call, abort the run.
//! - **Recoverable**: `CollaboratorUnavailable`, `CollaboratorTimeout` —
//!   retried against the round budget, then surfaced as a partial-result
//!   diagnostic.
//! - **Terminal**: `Exhausted` with zero accepted sentences.
//!
//! Per-candidate violations (schema, length, vocabulary, agreement, cloze,
//! numeral) are verdicts, not process errors — they live in
//! [`crate::validate::Violation`] and are counted, never raised.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForgeError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // -------------------------------------------------------------------------
    // Fatal Pre-flight Errors
    // -------------------------------------------------------------------------
    /// The vocabulary was empty after trim/lowercase/dedupe.
    #[error("vocabulary is empty after normalization")]
    EmptyVocabulary,

    /// A constraint bound was out of range or inconsistent.
    #[error("invalid constraint: {0}")]
    InvalidConstraint(String),

    #[error("config error: {0}")]
    Config(String),

    // -------------------------------------------------------------------------
    // Collaborator Errors (recoverable, budgeted)
    // -------------------------------------------------------------------------
    /// Transport failure reaching the generative collaborator.
    #[error("collaborator unavailable ({provider}): {message}")]
    CollaboratorUnavailable { provider: String, message: String },

    /// The collaborator did not answer within the configured deadline.
    #[error("collaborator timeout ({provider}) after {duration:?}")]
    CollaboratorTimeout {
        provider: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Run Outcome Errors
    // -------------------------------------------------------------------------
    /// Every round was spent and not a single sentence was accepted.
    #[error("retry budget exhausted after {rounds} rounds with no accepted sentences")]
    Exhausted { rounds: u32 },
}

impl ForgeError {
    /// Create a collaborator-unavailable error with provider context.
    pub fn unavailable(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CollaboratorUnavailable {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a collaborator-timeout error with provider context.
    pub fn timeout(provider: impl Into<String>, duration: Duration) -> Self {
        Self::CollaboratorTimeout {
            provider: provider.into(),
            duration,
        }
    }

    /// Check whether this error feeds the retry budget rather than
    /// aborting the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CollaboratorUnavailable { .. } | Self::CollaboratorTimeout { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, ForgeError>;

// =============================================================================
// Transport Classification
// =============================================================================

/// Map an HTTP status from a provider into the engine taxonomy.
///
/// Auth and malformed-request failures are configuration problems — retrying
/// them burns the round budget without any chance of success, so they abort.
/// Server-side and rate-limit failures count as the collaborator being
/// unavailable and feed the budget.
pub fn classify_http_status(status: u16, body: &str, provider: &str) -> ForgeError {
    match status {
        401 | 403 => ForgeError::Config(format!(
            "{provider} rejected credentials ({status}): {body}"
        )),
        400 | 404 | 422 => ForgeError::Config(format!(
            "{provider} rejected request ({status}): {body}"
        )),
        _ => ForgeError::unavailable(provider, format!("HTTP {status}: {body}")),
    }
}

/// Map a transport-layer failure from `reqwest` into the engine taxonomy.
pub fn classify_transport(err: &reqwest::Error, provider: &str, deadline: Duration) -> ForgeError {
    if err.is_timeout() {
        ForgeError::timeout(provider, deadline)
    } else {
        ForgeError::unavailable(provider, err.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_variants() {
        assert!(ForgeError::unavailable("ollama", "connection refused").is_recoverable());
        assert!(ForgeError::timeout("openai", Duration::from_secs(30)).is_recoverable());
    }

    #[test]
    fn test_fatal_variants() {
        assert!(!ForgeError::EmptyVocabulary.is_recoverable());
        assert!(!ForgeError::InvalidConstraint("min_words > max_words".into()).is_recoverable());
        assert!(!ForgeError::Exhausted { rounds: 3 }.is_recoverable());
    }

    #[test]
    fn test_classify_auth_status() {
        let err = classify_http_status(401, "bad key", "openai");
        assert!(matches!(err, ForgeError::Config(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_classify_server_status() {
        let err = classify_http_status(503, "overloaded", "openai");
        assert!(matches!(err, ForgeError::CollaboratorUnavailable { .. }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_display_includes_provider() {
        let err = ForgeError::unavailable("ollama", "refused");
        assert!(err.to_string().contains("ollama"));
    }
}
