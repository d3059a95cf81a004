//! Check Command
//!
//! Offline validation of an existing candidate JSON file against the
//! vocabulary and constraints. No collaborator call is made; this is the
//! validator applied standalone, the way hand-written or previously
//! generated decks get vetted before import.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::output::Output;
use crate::config::ConfigLoader;
use crate::types::{ForgeError, Result, Verdict, ViolationKind};
use crate::validate::{OutputValidator, parse_batch};
use crate::vocab::{load_hints, load_vocabulary};

pub fn run(file: &Path, vocab: Option<PathBuf>, hints: Option<PathBuf>) -> Result<bool> {
    let config = ConfigLoader::load()?;
    let out = Output::new();

    let vocab_path = vocab.or(config.vocabulary.path.clone()).ok_or_else(|| {
        ForgeError::Config("no vocabulary file: pass --vocab or set vocabulary.path".to_string())
    })?;

    let mut index = load_vocabulary(&vocab_path)?;
    if let Some(hints_path) = hints.or(config.vocabulary.hints.clone()) {
        index.apply_hints(&load_hints(&hints_path)?);
    }

    let spec = config.generation.constraint_spec(index.has_numerals())?;
    let validator = OutputValidator::new(Arc::new(index), spec);

    let raw = fs::read_to_string(file)?;
    let batch = parse_batch(&raw);

    let mut histogram: BTreeMap<ViolationKind, u64> = BTreeMap::new();
    let mut passed = 0usize;

    for violation in &batch.schema_violations {
        out.error(&violation.to_string());
        *histogram.entry(violation.kind).or_default() += 1;
    }

    for candidate in &batch.candidates {
        match validator.verdict(candidate) {
            Verdict::Accepted => {
                passed += 1;
                out.success(&candidate.text);
            }
            Verdict::NeedsRepair(violation) | Verdict::Rejected(violation) => {
                out.error(&format!("{} — {}", candidate.text, violation));
                *histogram.entry(violation.kind).or_default() += 1;
            }
        }
    }

    let failed: u64 = histogram.values().sum();
    let total = batch.candidates.len() + batch.schema_violations.len();

    out.section("Check summary");
    out.kv("file", &file.display().to_string());
    out.kv("passed", &format!("{passed}/{total}"));
    for (kind, count) in &histogram {
        out.kv(&format!("failed ({kind})"), &count.to_string());
    }

    if failed == 0 {
        out.success("All candidates pass");
    } else {
        out.warning(&format!("{failed} candidates fail validation"));
    }

    Ok(failed == 0)
}
