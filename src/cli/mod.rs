//! Command-Line Interface
//!
//! Subcommand implementations and styled terminal output. Argument parsing
//! lives in `main.rs`; each command here takes plain values so the logic
//! stays testable.

pub mod commands;
pub mod output;
