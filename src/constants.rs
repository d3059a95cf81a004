//! Global Constants
//!
//! Centralized constants for configuration and tuning.
//! All magic numbers should be defined here with documentation.

/// Constraint defaults and hard limits
pub mod constraints {
    /// Default minimum words per sentence
    pub const DEFAULT_MIN_WORDS: usize = 4;

    /// Default maximum words per sentence
    pub const DEFAULT_MAX_WORDS: usize = 7;

    /// Hard upper bound on either word limit
    pub const WORD_LIMIT_CAP: usize = 20;

    /// Default minimum cloze targets per sentence
    pub const DEFAULT_CLOZE_MIN: usize = 1;

    /// Default maximum cloze targets per sentence
    pub const DEFAULT_CLOZE_MAX: usize = 2;

    /// Fixed language tag for all generated sentences
    pub const LANGUAGE_TAG: &str = "es";
}

/// Generation round constants
pub mod rounds {
    /// Default retry budget (generation rounds per run)
    pub const DEFAULT_RETRY_BUDGET: u32 = 3;

    /// Default number of candidates requested per collaborator call
    pub const DEFAULT_BATCH_SIZE: usize = 10;

    /// Default number of accepted sentences a run aims for
    pub const DEFAULT_REQUESTED_COUNT: usize = 10;

    /// Maximum concurrent collaborator calls within one round
    pub const MAX_PARALLEL_BATCHES: usize = 4;

    /// Base delay for exponential backoff on recoverable failures (milliseconds)
    pub const BASE_DELAY_MS: u64 = 500;

    /// Maximum delay between retries (seconds)
    pub const MAX_DELAY_SECS: u64 = 30;
}

/// Network constants
pub mod network {
    /// Default collaborator request timeout (seconds)
    pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

    /// Connection establishment timeout (seconds)
    pub const CONNECTION_TIMEOUT_SECS: u64 = 10;
}

/// Output constants
pub mod output {
    /// Default path for the accepted-sentence artifact
    pub const DEFAULT_OUTPUT_PATH: &str = "sentences_generated.json";
}
