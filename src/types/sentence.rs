//! Sentence Data Model
//!
//! Candidate sentences arrive from the collaborator untrusted, are promoted
//! to [`ValidatedSentence`] only after passing every check, and leave the
//! engine inside a [`FinalSet`] together with the run's diagnostic report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::verdict::ViolationKind;

// =============================================================================
// Candidate (untrusted)
// =============================================================================

/// One sentence object as claimed by the external collaborator.
///
/// Untrusted until validated. The gloss field accepts both `english_gloss`
/// and the legacy `notes` key seen in hand-written decks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSentence {
    pub text: String,
    #[serde(default)]
    pub clozes: Vec<String>,
    #[serde(alias = "notes", default)]
    pub english_gloss: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl CandidateSentence {
    pub fn new(text: impl Into<String>, clozes: Vec<String>, gloss: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clozes,
            english_gloss: gloss.into(),
            tags: Vec::new(),
        }
    }
}

// =============================================================================
// Validated Sentence
// =============================================================================

/// A candidate that passed every rule. Immutable once constructed; only the
/// pipeline promotes candidates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedSentence {
    text: String,
    clozes: Vec<String>,
    english_gloss: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
}

impl ValidatedSentence {
    /// Promote a candidate whose verdict resolved to Accepted.
    pub(crate) fn promote(candidate: CandidateSentence) -> Self {
        Self {
            text: candidate.text,
            clozes: candidate.clozes,
            english_gloss: candidate.english_gloss,
            tags: candidate.tags,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn clozes(&self) -> &[String] {
        &self.clozes
    }

    pub fn english_gloss(&self) -> &str {
        &self.english_gloss
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Render the sentence with Anki cloze markup, replacing the first
    /// occurrence of each target with `{{cN::target}}`.
    ///
    /// Matching is case-insensitive but the replacement keeps the text's own
    /// spelling. Returns `None` when no marker could be inserted — such a
    /// card would have nothing to hide and is skipped by callers.
    pub fn anki_cloze(&self) -> Option<String> {
        let mut rendered = self.text.clone();
        let mut index = 1;

        for target in &self.clozes {
            if target.is_empty() {
                continue;
            }
            let haystack = rendered.to_lowercase();
            let needle = target.to_lowercase();
            if let Some(start) = haystack.find(&needle) {
                let end = start + needle.len();
                let original = &rendered[start..end];
                let marker = format!("{{{{c{index}::{original}}}}}");
                rendered.replace_range(start..end, &marker);
                index += 1;
            }
        }

        if index > 1 { Some(rendered) } else { None }
    }
}

// =============================================================================
// Run Report & Final Set
// =============================================================================

/// Aggregate diagnostics for one pipeline run.
///
/// Every discarded candidate's violation kind is counted here; collaborator
/// transport failures are tallied separately. Nothing is silently dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub requested: usize,
    pub accepted: usize,
    pub rounds_used: u32,
    /// True when the retry budget was spent before reaching the target.
    pub exhausted: bool,
    /// Collaborator transport failures absorbed by the retry budget.
    pub collaborator_failures: u64,
    /// Discard histogram keyed by violation kind.
    pub violations: BTreeMap<ViolationKind, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn total_discarded(&self) -> u64 {
        self.violations.values().sum()
    }
}

/// The ordered, deduplicated output of a run: accepted sentences plus the
/// diagnostic report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalSet {
    pub sentences: Vec<ValidatedSentence>,
    pub report: RunReport,
}

impl FinalSet {
    /// Serialize only the accepted sentences — the artifact consumers read.
    pub fn sentences_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.sentences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validated(text: &str, clozes: &[&str]) -> ValidatedSentence {
        ValidatedSentence::promote(CandidateSentence::new(
            text,
            clozes.iter().map(|s| s.to_string()).collect(),
            "gloss",
        ))
    }

    #[test]
    fn test_candidate_accepts_notes_alias() {
        let item: CandidateSentence =
            serde_json::from_str(r#"{"text": "Veo la arcilla.", "clozes": ["arcilla"], "notes": "I see the clay"}"#)
                .unwrap();
        assert_eq!(item.english_gloss, "I see the clay");
    }

    #[test]
    fn test_anki_cloze_single_target() {
        let s = validated("Veo la arcilla.", &["arcilla"]);
        assert_eq!(s.anki_cloze().unwrap(), "Veo la {{c1::arcilla}}.");
    }

    #[test]
    fn test_anki_cloze_numbers_targets_in_order() {
        let s = validated("La doctora ve la arcilla.", &["doctora", "arcilla"]);
        assert_eq!(
            s.anki_cloze().unwrap(),
            "La {{c1::doctora}} ve la {{c2::arcilla}}."
        );
    }

    #[test]
    fn test_anki_cloze_case_insensitive_match_keeps_casing() {
        let s = validated("Arcilla roja aquí está.", &["arcilla"]);
        assert_eq!(s.anki_cloze().unwrap(), "{{c1::Arcilla}} roja aquí está.");
    }

    #[test]
    fn test_anki_cloze_none_when_no_target_found() {
        let s = validated("Veo la arcilla.", &["piedra"]);
        assert!(s.anki_cloze().is_none());
    }

    #[test]
    fn test_sentence_serialization_shape() {
        let s = validated("Veo la arcilla.", &["arcilla"]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["text"], "Veo la arcilla.");
        assert_eq!(json["clozes"][0], "arcilla");
        assert_eq!(json["english_gloss"], "gloss");
        // Empty tags are omitted from the artifact.
        assert!(json.get("tags").is_none());
    }
}
