//! # docchat CLI
//!
//! The `docchat` binary answers questions about your own documents.
//!
//! ## Usage
//!
//! ```bash
//! docchat --config ./docchat.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docchat build <paths>...` | Extract, chunk, embed, and index documents |
//! | `docchat ask "<question>"` | Answer one question against the index |
//! | `docchat chat` | Interactive question loop with an answer cache |
//!
//! Every command needs `GOOGLE_API_KEY` set in the environment; a missing
//! key is reported before any work starts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use docchat::{ask, config, ingest};

/// docchat — question answering over local documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file; a missing file means built-in defaults.
#[derive(Parser)]
#[command(
    name = "docchat",
    about = "Ask questions about your documents from the command line",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./docchat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Build the vector index from documents.
    ///
    /// Extracts text from the given files and directories (PDF, txt, md),
    /// chunks it, embeds every chunk, and atomically replaces the index
    /// file. Re-running replaces the previous index wholesale.
    Build {
        /// Files or directories to index.
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Answer a single question against the built index.
    Ask {
        /// The question to answer.
        question: String,
    },

    /// Start an interactive question session.
    ///
    /// Questions repeated verbatim within the session are answered from
    /// the session cache without calling any external service.
    Chat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config(&cli.config)?;
    let api_key = config::require_api_key()?;

    match cli.command {
        Commands::Build { paths } => ingest::run_build(&cfg, api_key, &paths).await?,
        Commands::Ask { question } => ask::run_ask(&cfg, api_key, &question).await?,
        Commands::Chat => ask::run_chat(&cfg, api_key).await?,
    }

    Ok(())
}
