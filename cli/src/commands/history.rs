//! # Chat History Commands (`snorelax history`)
//!
//! File: cli/src/commands/history.rs
//!
//! `history list` prints the flat chat memory written by `ask`/`repl`, or with
//! `--user` the conversations the API server stored for that user.
//!
use crate::core::config::Config;
use crate::core::error::Result;
use crate::store::{ChatCollection, ChatRecord, JsonLog};
use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    #[command(subcommand)]
    command: HistoryCommand,
}

#[derive(Subcommand, Debug)]
enum HistoryCommand {
    /// Print stored exchanges, oldest first.
    List {
        /// Show only the last N entries.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
        /// Read the server's conversation collection for this user instead.
        #[arg(long)]
        user: Option<String>,
        /// Print raw JSON.
        #[arg(long)]
        json: bool,
    },
}

pub async fn handle_history(args: HistoryArgs, cfg: &Config) -> Result<()> {
    match args.command {
        HistoryCommand::List { limit, user, json } => match user {
            Some(user) => list_conversations(cfg, &user, limit, json).await,
            None => list_memory(cfg, limit, json),
        },
    }
}

fn tail<T>(items: &[T], limit: Option<usize>) -> &[T] {
    let keep = limit.unwrap_or(items.len()).min(items.len());
    &items[items.len() - keep..]
}

fn list_memory(cfg: &Config, limit: Option<usize>, json: bool) -> Result<()> {
    let records = JsonLog::<ChatRecord>::new(cfg.history_path()).load()?;
    let shown = tail(&records, limit);
    if json {
        println!("{}", serde_json::to_string_pretty(shown).context("Failed to encode history")?);
        return Ok(());
    }
    if shown.is_empty() {
        println!("No chat history yet.");
    }
    for record in shown {
        println!("[{}]", record.timestamp);
        println!("You: {}", record.user);
        println!("Bot: {}", record.bot);
    }
    Ok(())
}

async fn list_conversations(cfg: &Config, user: &str, limit: Option<usize>, json: bool) -> Result<()> {
    let collection = ChatCollection::open(&cfg.database_path()).await?;
    let conversations = collection.find_by_user(user).await?;
    let shown = tail(&conversations, limit);
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(shown).context("Failed to encode conversations")?
        );
        return Ok(());
    }
    if shown.is_empty() {
        println!("No conversations stored for {}.", user);
    }
    for conversation in shown {
        println!("[{}] mood: {}", conversation.created_at.to_rfc3339(), conversation.mood);
        println!("You: {}", conversation.user_message);
        println!("Bot: {}", conversation.bot_reply);
    }
    Ok(())
}
