//! Pipeline Runner
//!
//! Wires the engine together for one run: generation rounds against the
//! retry budget, parallel batch invocations, verdict routing through the
//! policy, and final assembly. Holds no state across runs.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use backon::{BackoffBuilder, ExponentialBuilder};
use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::{GenerationInvoker, GenerationRequest, SharedProvider, TimeoutConfig};
use crate::constants::rounds;
use crate::pipeline::assembler::{ResultAssembler, RunDiagnostics};
use crate::pipeline::policy::{Disposition, RepairOrRejectPolicy, RoundState, RoundTracker};
use crate::types::{
    ConstraintSpec, FinalSet, ForgeError, Result, ValidatedSentence, Verdict, ViolationKind,
};
use crate::validate::tokens::collapse_whitespace;
use crate::validate::{OutputValidator, parse_batch};
use crate::vocab::VocabularyIndex;

// =============================================================================
// Cancellation
// =============================================================================

/// Cooperative cancellation flag, checked between retry rounds so a caller
/// can abort a long-running repair loop.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Engine Options
// =============================================================================

/// Caller-settable knobs for one run.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Accepted sentences the run aims for.
    pub requested_count: usize,
    /// Candidates requested per collaborator call.
    pub batch_size: usize,
    /// Generation rounds before the run is exhausted.
    pub retry_budget: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            requested_count: rounds::DEFAULT_REQUESTED_COUNT,
            batch_size: rounds::DEFAULT_BATCH_SIZE,
            retry_budget: rounds::DEFAULT_RETRY_BUDGET,
        }
    }
}

// =============================================================================
// Engine
// =============================================================================

/// One-run pipeline: constraint spec and vocabulary in, final set out.
pub struct Engine {
    validator: OutputValidator,
    invoker: GenerationInvoker,
    policy: RepairOrRejectPolicy,
    options: EngineOptions,
}

impl Engine {
    pub fn new(
        index: Arc<VocabularyIndex>,
        spec: ConstraintSpec,
        provider: SharedProvider,
        timeouts: TimeoutConfig,
        options: EngineOptions,
    ) -> Self {
        Self {
            validator: OutputValidator::new(index, spec),
            invoker: GenerationInvoker::new(provider, timeouts),
            policy: RepairOrRejectPolicy,
            options,
        }
    }

    /// Run generation rounds until the target count is reached, the retry
    /// budget is spent, or the caller cancels.
    ///
    /// Returns `Exhausted` only when the budget is spent with zero accepted
    /// sentences; any other shortfall surfaces as a partial result with
    /// diagnostics.
    pub async fn run(&self, cancel: &CancelFlag) -> Result<FinalSet> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(
            %run_id,
            provider = self.invoker.provider_name(),
            requested = self.options.requested_count,
            budget = self.options.retry_budget,
            "Starting generation run"
        );

        let mut accepted: Vec<ValidatedSentence> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut violations: BTreeMap<ViolationKind, u64> = BTreeMap::new();
        let mut collaborator_failures = 0u64;
        let mut tracker = RoundTracker::new(self.options.retry_budget);
        let mut backoff = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(rounds::BASE_DELAY_MS))
            .with_max_delay(Duration::from_secs(rounds::MAX_DELAY_SECS))
            .with_jitter()
            .without_max_times()
            .build();

        while tracker.can_continue() {
            if cancel.is_cancelled() {
                info!(%run_id, "Run cancelled, surfacing partial result");
                break;
            }

            let remaining = self
                .options
                .requested_count
                .saturating_sub(accepted.len());
            if remaining == 0 {
                break;
            }

            let requests: Vec<GenerationRequest> = batch_plan(remaining, self.options.batch_size)
                .into_iter()
                .map(|size| {
                    GenerationRequest::new(self.validator.spec(), self.validator.index(), size)
                })
                .collect();

            debug!(
                round = tracker.rounds_used() + 1,
                batches = requests.len(),
                remaining,
                "Launching generation round"
            );

            let results = join_all(requests.iter().map(|r| self.invoker.request(r))).await;

            for result in results {
                match result {
                    Ok(raw) => {
                        self.consume_payload(&raw, &mut accepted, &mut seen, &mut violations);
                    }
                    Err(e) if e.is_recoverable() => {
                        warn!(error = %e, "Collaborator call failed, counting against budget");
                        collaborator_failures += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            let reached = accepted.len() >= self.options.requested_count;
            let state = tracker.record_round(reached);

            if state == RoundState::Retried {
                let delay = backoff.next().unwrap_or_default();
                debug!(delay_ms = delay.as_millis() as u64, "Round fell short, backing off");
                tokio::time::sleep(delay).await;
            }
        }

        let exhausted = tracker.state() == RoundState::Exhausted;
        if exhausted && accepted.is_empty() {
            return Err(ForgeError::Exhausted {
                rounds: tracker.rounds_used(),
            });
        }

        let diagnostics = RunDiagnostics {
            run_id,
            requested: self.options.requested_count,
            rounds_used: tracker.rounds_used(),
            exhausted,
            collaborator_failures,
            violations,
            started_at,
            finished_at: Utc::now(),
        };

        let set = ResultAssembler.assemble(accepted, diagnostics);
        info!(
            %run_id,
            accepted = set.report.accepted,
            requested = set.report.requested,
            rounds = set.report.rounds_used,
            discarded = set.report.total_discarded(),
            "Run finished"
        );
        Ok(set)
    }

    /// Validate one raw payload and route every candidate through the
    /// policy. All discards land in the histogram.
    fn consume_payload(
        &self,
        raw: &str,
        accepted: &mut Vec<ValidatedSentence>,
        seen: &mut HashSet<String>,
        violations: &mut BTreeMap<ViolationKind, u64>,
    ) {
        let batch = parse_batch(raw);
        if batch.repaired {
            debug!("Payload required mechanical JSON repair");
        }
        for violation in &batch.schema_violations {
            debug!(%violation, "Schema violation in payload");
            *violations.entry(violation.kind).or_default() += 1;
        }

        for candidate in batch.candidates {
            match self.policy.decide(self.validator.verdict(&candidate)) {
                Disposition::Accept => {
                    push_unique(accepted, seen, ValidatedSentence::promote(candidate));
                }
                Disposition::Repair(violation) => {
                    let repaired = self.policy.repair(
                        &candidate,
                        &violation,
                        self.validator.index(),
                        self.validator.spec(),
                    );
                    match repaired.map(|r| (self.validator.verdict(&r), r)) {
                        Some((Verdict::Accepted, repaired)) => {
                            debug!(text = %repaired.text, "Candidate accepted after repair");
                            push_unique(accepted, seen, ValidatedSentence::promote(repaired));
                        }
                        _ => {
                            debug!(%violation, "Repair failed, discarding candidate");
                            *violations.entry(violation.kind).or_default() += 1;
                        }
                    }
                }
                Disposition::Discard(violation) => {
                    debug!(%violation, text = %candidate.text, "Candidate discarded");
                    *violations.entry(violation.kind).or_default() += 1;
                }
            }
        }
    }
}

/// Dedupe at accept time so duplicate candidates never count toward the
/// target; the assembler remains the authoritative dedup pass.
fn push_unique(
    accepted: &mut Vec<ValidatedSentence>,
    seen: &mut HashSet<String>,
    sentence: ValidatedSentence,
) {
    if seen.insert(collapse_whitespace(sentence.text())) {
        accepted.push(sentence);
    }
}

/// Split the remaining work into per-call batch sizes, capped at the
/// parallelism limit.
fn batch_plan(remaining: usize, batch_size: usize) -> Vec<usize> {
    let batch_size = batch_size.max(1);
    let mut plan = Vec::new();
    let mut left = remaining;
    while left > 0 && plan.len() < rounds::MAX_PARALLEL_BATCHES {
        let take = left.min(batch_size);
        plan.push(take);
        left -= take;
    }
    plan
}
