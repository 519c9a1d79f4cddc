//! # SnoRelax Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! Entry point for the SnoRelax chatbot CLI. It handles:
//! - Command-line argument parsing using Clap
//! - Loading `.env` and the TOML configuration
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to the command handlers
//!
//! ## Architecture
//!
//! - `bot`: reply engines (rules, intents classifier, remote providers, guide)
//! - `store`: conversation collection and JSON logs
//! - `commands`: one module per top-level command
//! - `core`: configuration and error types
//! - `common`: filesystem and prompt helpers
//!
//! ## Examples
//!
//! ```bash
//! snorelax ask "how are you?"
//! snorelax -v repl --engine intents
//! snorelax serve --port 8080
//! ```
//!
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

mod bot;
mod commands;
mod common;
mod core;
mod store;

#[derive(Parser, Debug)]
#[command(
    name = "snorelax",
    about = "SnoRelax: a small wellness chatbot",
    long_about = "Chat from the terminal with rule, intent-classifier or remote (Cohere / Hugging Face) replies,\n\
                  keep a mood log, get wellness guides, and serve the chat API for the web client.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Directory for history, logs, the database and model files.
    #[arg(long, global = true, env = "SNORELAX_DATA_DIR")]
    data_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
enum Commands {
    /// Answer one message (argument or stdin), or start a chat when neither is given.
    #[command(alias = "a")]
    Ask(commands::ask::AskArgs),
    /// Interactive chat.
    #[command(alias = "chat")]
    Repl(commands::repl::ReplArgs),
    /// Manage the intents table and classifier model.
    #[command(alias = "i")]
    Intents(commands::intents::IntentsArgs),
    /// Show stored conversations.
    History(commands::history::HistoryArgs),
    /// Detect, log and list moods.
    #[command(alias = "m")]
    Mood(commands::mood::MoodArgs),
    /// Build a wellness guide for a user.
    Guide(commands::guide::GuideArgs),
    /// Run the chat API server.
    #[command(alias = "s")]
    Serve(commands::serve::ServeArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> core::error::Result<()> {
    let cfg = core::config::load_config(cli.data_dir.as_deref())?;

    match cli.command {
        Commands::Ask(args) => commands::ask::handle_ask(args, &cfg).await,
        Commands::Repl(args) => commands::repl::handle_repl(args, &cfg).await,
        Commands::Intents(args) => commands::intents::handle_intents(args, &cfg).await,
        Commands::History(args) => commands::history::handle_history(args, &cfg).await,
        Commands::Mood(args) => commands::mood::handle_mood(args, &cfg).await,
        Commands::Guide(args) => commands::guide::handle_guide(args, &cfg).await,
        Commands::Serve(args) => commands::serve::handle_serve(args, &cfg).await,
    }
}
