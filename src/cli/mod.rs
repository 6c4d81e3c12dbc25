//! CLI parser and command dispatch.

mod helpers;
mod publish;
mod stored;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Config, LoadOptions};

#[derive(Parser)]
#[command(name = "ocr2notion")]
#[command(about = "OCR scanned Google Drive files and publish them to Notion")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the files of a Drive file list or change list
    Send {
        /// JSON file: a Drive FileList/ChangeList response or a bare array
        #[arg(short, long)]
        input: PathBuf,
    },

    /// OCR every configured scan folder and publish the results
    Ocr,

    /// Show pages already published and the ones past capacity
    Stored {
        /// Number of pages to keep (defaults to the configured capacity)
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
    };
    let config = Config::load_with_options(&options).await?;
    if let Some(path) = &config.source_path {
        tracing::debug!("Using config file {}", path.display());
    }

    match cli.command {
        Commands::Send { input } => publish::cmd_send(&config, &input).await,
        Commands::Ocr => publish::cmd_ocr(&config).await,
        Commands::Stored { limit } => stored::cmd_stored(&config, limit).await,
    }
}
