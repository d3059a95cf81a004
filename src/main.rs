use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clozeforge::cli::commands::{check, config_cmd, generate};

#[derive(Parser)]
#[command(name = "clozeforge")]
#[command(
    version,
    about = "Constrained sentence generator and validator for cloze flashcard decks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate validated sentences from the allowed vocabulary
    Generate {
        #[arg(long, help = "Vocabulary file (JSON word list or entries)")]
        vocab: Option<PathBuf>,
        #[arg(long, help = "YAML hints file (word: pos overlays)")]
        hints: Option<PathBuf>,
        #[arg(long, short = 'n', help = "Number of accepted sentences to aim for")]
        count: Option<usize>,
        #[arg(long, short, help = "Output path for the sentence artifact")]
        output: Option<PathBuf>,
        #[arg(long, help = "LLM provider (openai, ollama)")]
        provider: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(long, help = "Minimum words per sentence")]
        min_words: Option<usize>,
        #[arg(long, help = "Maximum words per sentence")]
        max_words: Option<usize>,
        #[arg(long, help = "Candidates requested per collaborator call")]
        batch_size: Option<usize>,
        #[arg(long, help = "Generation rounds before giving up")]
        retry_budget: Option<u32>,
        #[arg(long, help = "Also emit Anki {{cN::...}} markup per sentence")]
        anki: bool,
    },

    /// Validate an existing candidate JSON file (no collaborator call)
    Check {
        #[arg(help = "Candidate JSON file to validate")]
        file: PathBuf,
        #[arg(long, help = "Vocabulary file (JSON word list or entries)")]
        vocab: Option<PathBuf>,
        #[arg(long, help = "YAML hints file (word: pos overlays)")]
        hints: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Output as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mclozeforge encountered an unexpected error:\x1b[0m");
        eprintln!("  {message}");

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }

        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Generate {
            vocab,
            hints,
            count,
            output,
            provider,
            model,
            min_words,
            max_words,
            batch_size,
            retry_budget,
            anki,
        } => {
            generate::run(generate::GenerateArgs {
                vocab,
                hints,
                count,
                output,
                provider,
                model,
                min_words,
                max_words,
                batch_size,
                retry_budget,
                anki,
            })?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check { file, vocab, hints } => {
            let all_passed = check::run(&file, vocab, hints)?;
            Ok(if all_passed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Config { action } => {
            match action {
                ConfigAction::Show { json } => config_cmd::show(json)?,
                ConfigAction::Path => config_cmd::path()?,
                ConfigAction::Init { global, force } => config_cmd::init(global, force)?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
