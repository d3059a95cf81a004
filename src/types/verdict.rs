//! Validation Verdicts
//!
//! The verdict attached to every candidate sentence after validation, and
//! the violation taxonomy backing it. Schema and cloze violations are
//! formatting slips the policy may repair once; the remaining kinds reflect
//! content problems and discard the candidate outright.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The reason a candidate failed a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// Raw output did not parse into the required object shape.
    Schema,
    /// Word count outside the configured bounds.
    Length,
    /// A content word is absent from the vocabulary.
    Vocabulary,
    /// Article/adjective does not match its noun's gender or number.
    Agreement,
    /// A claimed cloze is not a substring of the text, or cloze count is
    /// out of bounds.
    Cloze,
    /// A free-standing numeral not present in the vocabulary.
    Numeral,
}

impl ViolationKind {
    /// Whether the policy attempts a single local repair before discarding.
    pub fn is_repairable(self) -> bool {
        matches!(self, Self::Schema | Self::Cloze)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Schema => "schema",
            Self::Length => "length",
            Self::Vocabulary => "vocabulary",
            Self::Agreement => "agreement",
            Self::Cloze => "cloze",
            Self::Numeral => "numeral",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single violation with its detail and, where applicable, the offending
/// token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub token: Option<String>,
}

impl Violation {
    pub fn new(kind: ViolationKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
            token: None,
        }
    }

    /// Attach the offending token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token {
            Some(token) => write!(f, "{} violation ({}): {}", self.kind, token, self.detail),
            None => write!(f, "{} violation: {}", self.kind, self.detail),
        }
    }
}

/// Outcome of validating one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    /// Mechanically fixable; the policy gets one repair attempt.
    NeedsRepair(Violation),
    /// Content violation; the candidate is discarded and counted.
    Rejected(Violation),
}

impl Verdict {
    /// Route a violation by its kind: repairable kinds become
    /// `NeedsRepair`, the rest `Rejected`.
    pub fn from_violation(violation: Violation) -> Self {
        if violation.kind.is_repairable() {
            Self::NeedsRepair(violation)
        } else {
            Self::Rejected(violation)
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Self::Accepted => None,
            Self::NeedsRepair(v) | Self::Rejected(v) => Some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repairable_kinds() {
        assert!(ViolationKind::Schema.is_repairable());
        assert!(ViolationKind::Cloze.is_repairable());
        assert!(!ViolationKind::Vocabulary.is_repairable());
        assert!(!ViolationKind::Length.is_repairable());
        assert!(!ViolationKind::Agreement.is_repairable());
        assert!(!ViolationKind::Numeral.is_repairable());
    }

    #[test]
    fn test_verdict_routing() {
        let repair = Verdict::from_violation(Violation::new(ViolationKind::Cloze, "not found"));
        assert!(matches!(repair, Verdict::NeedsRepair(_)));

        let reject = Verdict::from_violation(
            Violation::new(ViolationKind::Vocabulary, "unknown word").with_token("perro"),
        );
        assert!(matches!(reject, Verdict::Rejected(_)));
        assert_eq!(reject.violation().unwrap().token.as_deref(), Some("perro"));
    }

    #[test]
    fn test_display_carries_token() {
        let v = Violation::new(ViolationKind::Vocabulary, "not in vocabulary").with_token("perro");
        assert!(v.to_string().contains("perro"));
    }
}
