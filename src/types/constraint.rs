//! Generation Constraints
//!
//! [`ConstraintSpec`] is the immutable description of what an acceptable
//! sentence looks like: word-count bounds, cloze-count bounds, the fixed
//! glue-verb set, and the numeral policy. It is constructed once per run,
//! validated at construction, and shared read-only across the pipeline.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::constants::constraints as limits;
use crate::types::error::{ForgeError, Result};

/// The seven permitted glue verbs. Their present-tense conjugations are
/// exempt from the vocabulary check alongside articles and basic pronouns.
pub const GLUE_VERBS: [&str; 7] = ["ser", "estar", "tener", "haber", "ir", "ver", "querer"];

/// Immutable, validated generation constraints.
///
/// Invariants enforced at construction:
/// - `1 <= min_words <= max_words <= 20`
/// - `cloze_min <= cloze_max <= max_words`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintSpec {
    /// Language tag for all generated sentences (fixed dialect variant).
    language: String,
    min_words: usize,
    max_words: usize,
    cloze_min: usize,
    cloze_max: usize,
    /// Whether free-standing numeral tokens are acceptable. Defaults to
    /// false; flipped on when the vocabulary itself contains numerals.
    numerals_allowed: bool,
}

impl Default for ConstraintSpec {
    fn default() -> Self {
        Self {
            language: limits::LANGUAGE_TAG.to_string(),
            min_words: limits::DEFAULT_MIN_WORDS,
            max_words: limits::DEFAULT_MAX_WORDS,
            cloze_min: limits::DEFAULT_CLOZE_MIN,
            cloze_max: limits::DEFAULT_CLOZE_MAX,
            numerals_allowed: false,
        }
    }
}

impl ConstraintSpec {
    /// Build a spec from explicit bounds, validating every range.
    pub fn new(
        min_words: usize,
        max_words: usize,
        cloze_min: usize,
        cloze_max: usize,
        numerals_allowed: bool,
    ) -> Result<Self> {
        let spec = Self {
            language: limits::LANGUAGE_TAG.to_string(),
            min_words,
            max_words,
            cloze_min,
            cloze_max,
            numerals_allowed,
        };
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<()> {
        if self.min_words == 0 {
            return Err(ForgeError::InvalidConstraint(
                "min_words must be positive".to_string(),
            ));
        }
        if self.min_words > self.max_words {
            return Err(ForgeError::InvalidConstraint(format!(
                "min_words ({}) exceeds max_words ({})",
                self.min_words, self.max_words
            )));
        }
        if self.max_words > limits::WORD_LIMIT_CAP {
            return Err(ForgeError::InvalidConstraint(format!(
                "max_words ({}) exceeds cap of {}",
                self.max_words,
                limits::WORD_LIMIT_CAP
            )));
        }
        if self.cloze_min > self.cloze_max {
            return Err(ForgeError::InvalidConstraint(format!(
                "cloze_min ({}) exceeds cloze_max ({})",
                self.cloze_min, self.cloze_max
            )));
        }
        if self.cloze_max > self.max_words {
            return Err(ForgeError::InvalidConstraint(format!(
                "cloze_max ({}) exceeds max_words ({})",
                self.cloze_max, self.max_words
            )));
        }
        Ok(())
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Inclusive word-count bounds for sentence text.
    pub fn word_bounds(&self) -> RangeInclusive<usize> {
        self.min_words..=self.max_words
    }

    /// Inclusive bounds on cloze targets per sentence.
    pub fn cloze_bounds(&self) -> RangeInclusive<usize> {
        self.cloze_min..=self.cloze_max
    }

    pub fn min_words(&self) -> usize {
        self.min_words
    }

    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn cloze_min(&self) -> usize {
        self.cloze_min
    }

    pub fn cloze_max(&self) -> usize {
        self.cloze_max
    }

    pub fn numerals_allowed(&self) -> bool {
        self.numerals_allowed
    }

    /// The fixed closed glue-verb set.
    pub fn glue_verbs(&self) -> &'static [&'static str] {
        &GLUE_VERBS
    }

    /// Return a copy with numerals allowed. Used when the vocabulary scan
    /// finds numeral tokens among the allowed words.
    pub fn with_numerals_allowed(mut self) -> Self {
        self.numerals_allowed = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds() {
        let spec = ConstraintSpec::default();
        assert_eq!(spec.word_bounds(), 4..=7);
        assert_eq!(spec.cloze_bounds(), 1..=2);
        assert!(!spec.numerals_allowed());
        assert_eq!(spec.language(), "es");
    }

    #[test]
    fn test_inverted_word_bounds_rejected() {
        let err = ConstraintSpec::new(8, 4, 1, 2, false).unwrap_err();
        assert!(matches!(err, ForgeError::InvalidConstraint(_)));
    }

    #[test]
    fn test_zero_min_words_rejected() {
        assert!(ConstraintSpec::new(0, 7, 1, 2, false).is_err());
    }

    #[test]
    fn test_word_cap_enforced() {
        assert!(ConstraintSpec::new(4, 21, 1, 2, false).is_err());
        assert!(ConstraintSpec::new(4, 20, 1, 2, false).is_ok());
    }

    #[test]
    fn test_cloze_bounds_checked_against_max_words() {
        assert!(ConstraintSpec::new(4, 7, 1, 8, false).is_err());
        let err = ConstraintSpec::new(4, 7, 3, 1, false).unwrap_err();
        assert!(err.to_string().contains("cloze_min"));
    }

    #[test]
    fn test_glue_verbs_fixed() {
        let spec = ConstraintSpec::default();
        assert_eq!(spec.glue_verbs().len(), 7);
        assert!(spec.glue_verbs().contains(&"ver"));
    }
}
