//! CLI front end for sotto.

pub mod commands;
pub mod config;
pub mod dirs;
pub mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::Config;

/// Application-specific environment variable for log filtering (overrides config).
const LOG_ENV_VAR: &str = "SOTTO_LOG";

#[derive(Parser)]
#[command(name = "sotto")]
#[command(about = "Sotto - streaming file transcription with local Whisper models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available models with size and cache status
    Models,
    /// Transcribe an audio file, streaming text as it decodes
    Transcribe {
        /// Path to a WAV file
        file: PathBuf,
        /// Model to use (defaults to the configured model)
        #[arg(short, long)]
        model: Option<String>,
        /// Language code such as "en" or "de"; "auto" detects
        #[arg(short, long)]
        language: Option<String>,
    },
}

/// Entry point for the sotto binary: configures logging and dispatches the
/// parsed command.
pub async fn run() -> anyhow::Result<()> {
    let config = Config::load().unwrap_or_default();

    // SOTTO_LOG env var overrides config file level
    let filter = match std::env::var(LOG_ENV_VAR) {
        Ok(env) => EnvFilter::try_new(env)?,
        Err(_) => EnvFilter::try_new(config.logging.level.as_directives())?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Route whisper.cpp and GGML logs through tracing
    sotto_engine::WhisperEngine::install_logging_hooks();

    let cli = Cli::parse();

    match cli.command {
        Commands::Models => commands::models(&config).await,
        Commands::Transcribe {
            file,
            model,
            language,
        } => commands::transcribe(&config, &file, model.as_deref(), language.as_deref()).await,
    }
}
