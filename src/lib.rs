//! ClozeForge - Constrained Cloze Sentence Generator
//!
//! A generation-and-validation engine for beginner language flashcards:
//! it asks an external generative model for simple Spanish sentences
//! restricted to a caller-supplied vocabulary, then deterministically
//! validates, repairs, or rejects every candidate before it reaches a
//! learner's deck.
//!
//! ## Core Features
//!
//! - **Untrusted collaborator boundary**: the model's output is treated as
//!   hostile input — schema-checked, repaired once, or discarded
//! - **Deterministic validation**: length, vocabulary, agreement, cloze,
//!   and numeral checks are pure functions of the candidate and the
//!   immutable vocabulary/constraints
//! - **Bounded retry loop**: an explicit round state machine with a fixed
//!   budget, partial results instead of open-ended regeneration
//! - **Provider abstraction**: OpenAI-compatible and local Ollama backends
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use clozeforge::{CancelFlag, Engine, EngineOptions};
//! use clozeforge::ai::{TimeoutConfig, create_provider, ProviderConfig};
//! use clozeforge::types::ConstraintSpec;
//! use clozeforge::vocab::VocabularyIndex;
//!
//! let index = Arc::new(VocabularyIndex::from_words(vec!["arcilla", "doctora"])?);
//! let spec = ConstraintSpec::default();
//! let provider = create_provider(&ProviderConfig::default())?;
//! let engine = Engine::new(index, spec, provider, TimeoutConfig::default(), EngineOptions::default());
//! let set = engine.run(&CancelFlag::new()).await?;
//! ```
//!
//! ## Modules
//!
//! - [`vocab`]: vocabulary index, loaders, category/gender model
//! - [`validate`]: the deterministic output validator
//! - [`ai`]: provider abstraction, prompt construction, JSON repair
//! - [`pipeline`]: repair-or-reject policy, assembler, engine runner
//! - [`config`]: layered configuration

pub mod ai;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod types;
pub mod validate;
pub mod vocab;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GenerationConfig, LlmConfig};

// Error Types
pub use types::error::{ForgeError, Result};

// Data Model
pub use types::{
    CandidateSentence, ConstraintSpec, FinalSet, RunReport, ValidatedSentence, Verdict, Violation,
    ViolationKind,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{CancelFlag, Engine, EngineOptions, RepairOrRejectPolicy, ResultAssembler};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{GenerationInvoker, GenerationRequest, LlmProvider, SharedProvider, TimeoutConfig};

// =============================================================================
// Vocabulary & Validation Re-exports
// =============================================================================

pub use validate::OutputValidator;
pub use vocab::{Category, Gender, VocabularyEntry, VocabularyIndex};
