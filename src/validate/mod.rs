//! Output Validation
//!
//! The central algorithm of the engine: every candidate the collaborator
//! returns passes through the checks below, in order, short-circuiting on
//! the first violation.
//!
//! 1. Schema — required fields present and non-empty
//! 2. Length — word count within bounds
//! 3. Vocabulary — every content word is an allowed word
//! 4. Agreement — articles/adjectives match their noun's gender and number
//! 5. Cloze — claimed targets are substrings of the text, count in bounds
//! 6. Numeral — free-standing numerals only when the vocabulary has them
//!
//! The validator is a pure function of (candidate, index, spec): no
//! randomness, no I/O, identical inputs always produce identical verdicts.

pub mod agreement;
pub mod tokens;

use std::sync::Arc;

use serde_json::Value;

use crate::ai::json_repair;
use crate::types::{CandidateSentence, ConstraintSpec, Verdict, Violation, ViolationKind};
use crate::vocab::VocabularyIndex;

use agreement::check_agreement;
use tokens::{is_glue, is_numeral, tokenize};

// =============================================================================
// Batch Parsing (schema stage for raw payloads)
// =============================================================================

/// Outcome of parsing one raw collaborator payload.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    /// Items that deserialized into the candidate shape.
    pub candidates: Vec<CandidateSentence>,
    /// One violation per item (or per payload) that did not.
    pub schema_violations: Vec<Violation>,
    /// Whether mechanical JSON repair was needed to parse the payload.
    pub repaired: bool,
}

/// Parse a raw text block into candidates.
///
/// The payload gets one mechanical repair pass (this is the schema
/// auto-repair the policy allots); whatever still fails afterwards is a
/// schema violation. Accepts a bare array or an object wrapping one under
/// a `sentences` key — collaborators routinely add such wrappers.
pub fn parse_batch(raw: &str) -> ParsedBatch {
    let mut batch = ParsedBatch::default();

    let (value, repaired) = match json_repair::parse_or_repair(raw) {
        Ok(parsed) => parsed,
        Err(detail) => {
            batch.repaired = true;
            batch
                .schema_violations
                .push(Violation::new(ViolationKind::Schema, detail));
            return batch;
        }
    };
    batch.repaired = repaired;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("sentences") {
            Some(Value::Array(items)) => items,
            _ => {
                batch.schema_violations.push(Violation::new(
                    ViolationKind::Schema,
                    "payload is not an array of sentence objects",
                ));
                return batch;
            }
        },
        other => {
            batch.schema_violations.push(Violation::new(
                ViolationKind::Schema,
                format!("payload is not an array (got {})", type_name(&other)),
            ));
            return batch;
        }
    };

    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<CandidateSentence>(item) {
            Ok(candidate) => batch.candidates.push(candidate),
            Err(e) => batch.schema_violations.push(Violation::new(
                ViolationKind::Schema,
                format!("item {idx} does not match the sentence schema: {e}"),
            )),
        }
    }

    batch
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Validator
// =============================================================================

/// Deterministic candidate validator over an immutable vocabulary and
/// constraint spec.
#[derive(Debug, Clone)]
pub struct OutputValidator {
    index: Arc<VocabularyIndex>,
    spec: ConstraintSpec,
}

impl OutputValidator {
    pub fn new(index: Arc<VocabularyIndex>, spec: ConstraintSpec) -> Self {
        Self { index, spec }
    }

    pub fn spec(&self) -> &ConstraintSpec {
        &self.spec
    }

    pub fn index(&self) -> &VocabularyIndex {
        &self.index
    }

    /// Run all checks in order and return the first violation, or Accepted.
    pub fn verdict(&self, candidate: &CandidateSentence) -> Verdict {
        if let Some(violation) = self
            .check_fields(candidate)
            .or_else(|| self.check_length(candidate))
            .or_else(|| self.check_vocabulary(candidate))
            .or_else(|| self.check_agreement(candidate))
            .or_else(|| self.check_clozes(candidate))
            .or_else(|| self.check_numerals(candidate))
        {
            Verdict::from_violation(violation)
        } else {
            Verdict::Accepted
        }
    }

    fn check_fields(&self, candidate: &CandidateSentence) -> Option<Violation> {
        if candidate.text.trim().is_empty() {
            return Some(Violation::new(ViolationKind::Schema, "text is empty"));
        }
        if candidate.english_gloss.trim().is_empty() {
            return Some(Violation::new(
                ViolationKind::Schema,
                "english_gloss is empty",
            ));
        }
        None
    }

    fn check_length(&self, candidate: &CandidateSentence) -> Option<Violation> {
        let count = tokenize(&candidate.text).len();
        if self.spec.word_bounds().contains(&count) {
            None
        } else {
            Some(Violation::new(
                ViolationKind::Length,
                format!(
                    "word count {count} outside {}..={}",
                    self.spec.min_words(),
                    self.spec.max_words()
                ),
            ))
        }
    }

    fn check_vocabulary(&self, candidate: &CandidateSentence) -> Option<Violation> {
        for token in tokenize(&candidate.text) {
            if is_glue(&token) {
                continue;
            }
            // Numerals are judged by their own check below.
            if is_numeral(&token) {
                continue;
            }
            if self.index.resolve(&token).is_none() {
                return Some(
                    Violation::new(
                        ViolationKind::Vocabulary,
                        format!("\"{token}\" is not in the allowed vocabulary"),
                    )
                    .with_token(token),
                );
            }
        }
        None
    }

    fn check_agreement(&self, candidate: &CandidateSentence) -> Option<Violation> {
        check_agreement(&tokenize(&candidate.text), &self.index)
    }

    fn check_clozes(&self, candidate: &CandidateSentence) -> Option<Violation> {
        let count = candidate.clozes.len();
        if !self.spec.cloze_bounds().contains(&count) {
            return Some(Violation::new(
                ViolationKind::Cloze,
                format!(
                    "cloze count {count} outside {}..={}",
                    self.spec.cloze_min(),
                    self.spec.cloze_max()
                ),
            ));
        }

        let haystack = candidate.text.to_lowercase();
        for cloze in &candidate.clozes {
            if cloze.trim().is_empty() {
                return Some(Violation::new(ViolationKind::Cloze, "empty cloze target"));
            }
            if !haystack.contains(&cloze.to_lowercase()) {
                return Some(
                    Violation::new(
                        ViolationKind::Cloze,
                        format!("cloze \"{cloze}\" is not a substring of the text"),
                    )
                    .with_token(cloze.clone()),
                );
            }
        }
        None
    }

    fn check_numerals(&self, candidate: &CandidateSentence) -> Option<Violation> {
        for token in tokenize(&candidate.text) {
            if !is_numeral(&token) {
                continue;
            }
            if self.spec.numerals_allowed() && self.index.contains(&token) {
                continue;
            }
            return Some(
                Violation::new(
                    ViolationKind::Numeral,
                    format!("numeral \"{token}\" is not in the allowed vocabulary"),
                )
                .with_token(token),
            );
        }
        None
    }
}
