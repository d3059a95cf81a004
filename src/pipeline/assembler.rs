//! Result Assembler
//!
//! Collects validated sentences into the final ordered output set:
//! deduplicates by whitespace-collapsed text, preserves first-seen order,
//! truncates to the requested count, and attaches the run's diagnostic
//! report. Pure — assembling the same inputs twice yields identical sets.

use std::collections::BTreeMap;
use std::collections::HashSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::types::{FinalSet, RunReport, ValidatedSentence, ViolationKind};
use crate::validate::tokens::collapse_whitespace;

/// Everything the runner observed about a run, stamped before assembly so
/// the assembler itself stays deterministic.
#[derive(Debug, Clone)]
pub struct RunDiagnostics {
    pub run_id: Uuid,
    pub requested: usize,
    pub rounds_used: u32,
    pub exhausted: bool,
    pub collaborator_failures: u64,
    pub violations: BTreeMap<ViolationKind, u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Assembles the final sentence set from validated sentences.
#[derive(Debug, Clone, Default)]
pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(
        &self,
        validated: Vec<ValidatedSentence>,
        diagnostics: RunDiagnostics,
    ) -> FinalSet {
        let mut seen: HashSet<String> = HashSet::new();
        let mut sentences: Vec<ValidatedSentence> = Vec::new();

        for sentence in validated {
            let key = collapse_whitespace(sentence.text());
            if seen.insert(key) {
                sentences.push(sentence);
            }
            if sentences.len() == diagnostics.requested {
                break;
            }
        }

        let report = RunReport {
            run_id: diagnostics.run_id,
            requested: diagnostics.requested,
            accepted: sentences.len(),
            rounds_used: diagnostics.rounds_used,
            exhausted: diagnostics.exhausted,
            collaborator_failures: diagnostics.collaborator_failures,
            violations: diagnostics.violations,
            started_at: diagnostics.started_at,
            finished_at: diagnostics.finished_at,
        };

        FinalSet { sentences, report }
    }
}
