//! Repair-or-Reject Policy
//!
//! Decides, per violation, whether a candidate gets one local repair
//! attempt or is discarded outright, and tracks the bounded round state
//! machine: Pending → Retried → … → Resolved | Exhausted. Looping is
//! always bounded by the retry budget, never open-ended.

use crate::types::{CandidateSentence, ConstraintSpec, Verdict, Violation, ViolationKind};
use crate::validate::tokens::{is_glue, is_numeral, tokenize};
use crate::vocab::VocabularyIndex;

// =============================================================================
// Per-candidate Disposition
// =============================================================================

/// What the policy does with one validated candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Passed every check; promote it.
    Accept,
    /// Mechanically fixable; attempt one local repair, then re-validate.
    Repair(Violation),
    /// Content violation; discard and count.
    Discard(Violation),
}

/// Per-violation repair/reject decisions plus the cloze auto-repair.
#[derive(Debug, Clone, Default)]
pub struct RepairOrRejectPolicy;

impl RepairOrRejectPolicy {
    /// Route a verdict. Schema and cloze violations get the single repair
    /// attempt; vocabulary, length, agreement, and numeral violations are
    /// content problems and discard immediately.
    pub fn decide(&self, verdict: Verdict) -> Disposition {
        match verdict {
            Verdict::Accepted => Disposition::Accept,
            Verdict::NeedsRepair(violation) => Disposition::Repair(violation),
            Verdict::Rejected(violation) => Disposition::Discard(violation),
        }
    }

    /// The one local auto-repair: re-derive cloze targets from vocabulary
    /// overlap. Content words of the sentence that the index recognizes
    /// become the new targets, in sentence order, truncated to the cloze
    /// bound. Returns `None` when too few targets can be derived — the
    /// candidate then escalates to a discard.
    ///
    /// Only cloze violations are locally repairable at this stage; schema
    /// payload repair already happened during parsing, and an empty text
    /// or gloss has nothing to repair from.
    pub fn repair(
        &self,
        candidate: &CandidateSentence,
        violation: &Violation,
        index: &VocabularyIndex,
        spec: &ConstraintSpec,
    ) -> Option<CandidateSentence> {
        match violation.kind {
            ViolationKind::Cloze => self.rederive_clozes(candidate, index, spec),
            _ => None,
        }
    }

    fn rederive_clozes(
        &self,
        candidate: &CandidateSentence,
        index: &VocabularyIndex,
        spec: &ConstraintSpec,
    ) -> Option<CandidateSentence> {
        let mut targets: Vec<String> = Vec::new();
        for token in tokenize(&candidate.text) {
            if is_glue(&token) || is_numeral(&token) {
                continue;
            }
            if index.resolve(&token).is_none() {
                continue;
            }
            if targets.iter().any(|t| t.eq_ignore_ascii_case(&token)) {
                continue;
            }
            targets.push(token);
            if targets.len() == spec.cloze_max() {
                break;
            }
        }

        if targets.len() < spec.cloze_min() {
            return None;
        }

        let mut repaired = candidate.clone();
        repaired.clozes = targets;
        Some(repaired)
    }
}

// =============================================================================
// Round State Machine
// =============================================================================

/// State of the generation-round loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundState {
    /// No round has completed yet.
    Pending,
    /// At least one round fell short; another is allowed.
    Retried,
    /// The retry budget is spent without reaching the target.
    Exhausted,
    /// The target count was reached.
    Resolved,
}

/// Tracks rounds against the retry budget and drives the state machine.
#[derive(Debug, Clone)]
pub struct RoundTracker {
    state: RoundState,
    rounds_used: u32,
    budget: u32,
}

impl RoundTracker {
    pub fn new(budget: u32) -> Self {
        Self {
            state: RoundState::Pending,
            rounds_used: 0,
            budget,
        }
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn rounds_used(&self) -> u32 {
        self.rounds_used
    }

    /// Whether another round may start.
    pub fn can_continue(&self) -> bool {
        matches!(self.state, RoundState::Pending | RoundState::Retried)
    }

    /// Record a completed round and advance the state machine.
    pub fn record_round(&mut self, reached_target: bool) -> RoundState {
        self.rounds_used += 1;
        self.state = if reached_target {
            RoundState::Resolved
        } else if self.rounds_used >= self.budget {
            RoundState::Exhausted
        } else {
            RoundState::Retried
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{Category, VocabularyEntry};
    use std::sync::Arc;

    fn index() -> Arc<VocabularyIndex> {
        Arc::new(
            VocabularyIndex::build(vec![
                VocabularyEntry::new("arcilla", Category::Noun),
                VocabularyEntry::new("doctora", Category::Noun),
                VocabularyEntry::new("aquí", Category::Other),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_decide_routes_by_verdict() {
        let policy = RepairOrRejectPolicy;
        assert_eq!(policy.decide(Verdict::Accepted), Disposition::Accept);

        let cloze = Violation::new(ViolationKind::Cloze, "missing");
        assert!(matches!(
            policy.decide(Verdict::NeedsRepair(cloze)),
            Disposition::Repair(_)
        ));

        let vocab = Violation::new(ViolationKind::Vocabulary, "unknown");
        assert!(matches!(
            policy.decide(Verdict::Rejected(vocab)),
            Disposition::Discard(_)
        ));
    }

    #[test]
    fn test_cloze_repair_from_vocabulary_overlap() {
        let policy = RepairOrRejectPolicy;
        let spec = ConstraintSpec::default();
        let candidate = CandidateSentence::new(
            "La doctora ve la arcilla.",
            vec!["piedra".to_string()],
            "gloss",
        );
        let violation = Violation::new(ViolationKind::Cloze, "not a substring");

        let repaired = policy
            .repair(&candidate, &violation, &index(), &spec)
            .unwrap();
        assert_eq!(repaired.clozes, vec!["doctora", "arcilla"]);
        assert_eq!(repaired.text, candidate.text);
    }

    #[test]
    fn test_cloze_repair_fails_without_content_words() {
        let policy = RepairOrRejectPolicy;
        let spec = ConstraintSpec::default();
        // Only glue words: nothing to derive a target from.
        let candidate = CandidateSentence::new("Yo soy él.", vec![], "gloss");
        let violation = Violation::new(ViolationKind::Cloze, "count 0");

        assert!(policy
            .repair(&candidate, &violation, &index(), &spec)
            .is_none());
    }

    #[test]
    fn test_schema_violation_not_locally_repairable() {
        let policy = RepairOrRejectPolicy;
        let spec = ConstraintSpec::default();
        let candidate = CandidateSentence::new("", vec![], "");
        let violation = Violation::new(ViolationKind::Schema, "text is empty");

        assert!(policy
            .repair(&candidate, &violation, &index(), &spec)
            .is_none());
    }

    #[test]
    fn test_round_tracker_resolves_on_target() {
        let mut tracker = RoundTracker::new(3);
        assert_eq!(tracker.state(), RoundState::Pending);
        assert!(tracker.can_continue());

        assert_eq!(tracker.record_round(false), RoundState::Retried);
        assert!(tracker.can_continue());

        assert_eq!(tracker.record_round(true), RoundState::Resolved);
        assert!(!tracker.can_continue());
        assert_eq!(tracker.rounds_used(), 2);
    }

    #[test]
    fn test_round_tracker_exhausts_budget() {
        let mut tracker = RoundTracker::new(2);
        tracker.record_round(false);
        assert_eq!(tracker.record_round(false), RoundState::Exhausted);
        assert!(!tracker.can_continue());
    }
}
