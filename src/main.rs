//! cmdforge - describe a shell command, get the command
//!
//! Requests are sent to the configured model together with whatever ambient
//! context is relevant (selection, terminal, working directory). Past
//! requests are kept in a short history that can be recalled and edited.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod ai;
mod cli;
mod config;
mod context;
mod core;
mod ui;

/// cmdforge - natural language to shell commands
#[derive(Parser)]
#[command(name = "cmdforge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Turn plain-language requests into shell commands", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Directory holding history
    #[arg(long, global = true, env = "CMDFORGE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Override the configured provider (claude, openai, ollama)
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a command for a request and print it
    Generate {
        /// What the command should do
        #[arg(required = true)]
        request: Vec<String>,

        /// Copy to the clipboard instead of printing
        #[arg(long)]
        copy: bool,

        /// Do not look at the selection, foreground app or terminal directory
        #[arg(long)]
        no_context: bool,
    },

    /// Show or edit request history
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize configuration file
        #[arg(long)]
        init: bool,
    },

    /// Show version, locations and provider status
    Info,
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List entries, most recent first
    List {
        /// Only entries containing this text (case-insensitive)
        query: Option<String>,
    },

    /// Forget every entry
    Clear,

    /// Forget one entry
    Remove {
        /// The exact entry text
        entry: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries generated commands, so logs go to stderr
    let level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(provider) = cli.provider {
        config.ai.provider = provider;
    }
    if cli.data_dir.is_some() {
        config.data_dir = cli.data_dir;
    }

    debug!(provider = %config.ai.provider, "cmdforge v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Generate {
            request,
            copy,
            no_context,
        }) => {
            cli::generate::run(config, &request, copy, no_context).await?;
        }
        Some(Commands::History { action }) => match action {
            None => cli::history::list(&config, None)?,
            Some(HistoryAction::List { query }) => cli::history::list(&config, query.as_deref())?,
            Some(HistoryAction::Clear) => cli::history::clear(&config)?,
            Some(HistoryAction::Remove { entry }) => cli::history::remove(&config, &entry)?,
        },
        Some(Commands::Config { show, init }) => {
            if init {
                config::init_config()?;
            } else if show {
                config::show_config(&config)?;
            }
        }
        Some(Commands::Info) => {
            cli::info::run(&config)?;
        }
        None => {
            cli::interactive::run(config).await?;
        }
    }

    Ok(())
}
