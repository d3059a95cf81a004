//! Generate Command
//!
//! Runs the full pipeline: vocabulary in, collaborator rounds, validation,
//! and the accepted-sentence artifact out.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tokio::runtime::Runtime;

use crate::ai::{TimeoutConfig, create_provider};
use crate::cli::output::Output;
use crate::config::{Config, ConfigLoader, OutputConfig};
use crate::pipeline::{CancelFlag, Engine, EngineOptions};
use crate::types::{FinalSet, ForgeError, Result};
use crate::vocab::{load_hints, load_vocabulary};

/// CLI overrides for one generation run. `None` fields fall back to the
/// layered configuration.
#[derive(Debug, Default)]
pub struct GenerateArgs {
    pub vocab: Option<PathBuf>,
    pub hints: Option<PathBuf>,
    pub count: Option<usize>,
    pub output: Option<PathBuf>,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub min_words: Option<usize>,
    pub max_words: Option<usize>,
    pub batch_size: Option<usize>,
    pub retry_budget: Option<u32>,
    pub anki: bool,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &args);
    config.validate()?;
    let out = Output::new();

    let vocab_path = config.vocabulary.path.clone().ok_or_else(|| {
        ForgeError::Config("no vocabulary file: pass --vocab or set vocabulary.path".to_string())
    })?;

    let mut index = load_vocabulary(&vocab_path)?;
    if let Some(hints_path) = &config.vocabulary.hints {
        index.apply_hints(&load_hints(hints_path)?);
    }
    out.info(&format!(
        "Loaded {} vocabulary words from {}",
        index.len(),
        vocab_path.display()
    ));

    // Numerals become legal exactly when the vocabulary lists them.
    let spec = config.generation.constraint_spec(index.has_numerals())?;

    let provider = create_provider(&config.llm.provider_config())?;
    let timeouts = TimeoutConfig::default().with_request_secs(config.llm.timeout_secs);
    let options = EngineOptions {
        requested_count: config.generation.requested_count,
        batch_size: config.generation.batch_size,
        retry_budget: config.generation.retry_budget,
    };

    let engine = Engine::new(Arc::new(index), spec, provider, timeouts, options);

    let rt = Runtime::new()?;
    let set = rt.block_on(async {
        let cancel = CancelFlag::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });
        engine.run(&cancel).await
    })?;

    write_artifact(&set, &config.output, &out)?;
    print_summary(&out, &set);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &GenerateArgs) {
    if args.vocab.is_some() {
        config.vocabulary.path = args.vocab.clone();
    }
    if args.hints.is_some() {
        config.vocabulary.hints = args.hints.clone();
    }
    if let Some(count) = args.count {
        config.generation.requested_count = count;
    }
    if let Some(output) = &args.output {
        config.output.path = output.clone();
    }
    if let Some(provider) = &args.provider {
        config.llm.provider = provider.clone();
    }
    if args.model.is_some() {
        config.llm.model = args.model.clone();
    }
    if let Some(min_words) = args.min_words {
        config.generation.min_words = min_words;
    }
    if let Some(max_words) = args.max_words {
        config.generation.max_words = max_words;
    }
    if let Some(batch_size) = args.batch_size {
        config.generation.batch_size = batch_size;
    }
    if let Some(retry_budget) = args.retry_budget {
        config.generation.retry_budget = retry_budget;
    }
    if args.anki {
        config.output.anki_cloze = true;
    }
}

/// Write the accepted sentences. In Anki mode each item additionally
/// carries the `{{cN::...}}` rendering; sentences where no marker could be
/// inserted are skipped, as a card with nothing to hide is useless.
fn write_artifact(set: &FinalSet, output: &OutputConfig, out: &Output) -> Result<()> {
    let rendered = if output.anki_cloze {
        let mut items = Vec::new();
        let mut skipped = 0usize;
        for sentence in &set.sentences {
            match sentence.anki_cloze() {
                Some(markup) => {
                    let mut item = json!({
                        "text": sentence.text(),
                        "clozes": sentence.clozes(),
                        "english_gloss": sentence.english_gloss(),
                        "anki": markup,
                    });
                    if !sentence.tags().is_empty() {
                        item["tags"] = json!(sentence.tags());
                    }
                    items.push(item);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            out.warning(&format!("Skipped {skipped} sentences with no cloze markers"));
        }
        serde_json::to_string_pretty(&items)?
    } else {
        set.sentences_json()?
    };

    if let Some(parent) = output.path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output.path, rendered)?;
    out.success(&format!("Wrote {} sentences to {}", set.sentences.len(), output.path.display()));
    Ok(())
}

fn print_summary(out: &Output, set: &FinalSet) {
    let report = &set.report;

    out.section("Run summary");
    out.kv("accepted", &format!("{}/{}", report.accepted, report.requested));
    out.kv("rounds", &report.rounds_used.to_string());
    if report.collaborator_failures > 0 {
        out.kv(
            "collaborator failures",
            &report.collaborator_failures.to_string(),
        );
    }
    for (kind, count) in &report.violations {
        out.kv(&format!("discarded ({kind})"), &count.to_string());
    }

    if report.exhausted {
        out.warning("Retry budget exhausted: partial result");
    } else {
        out.success("Target count reached");
    }
}
