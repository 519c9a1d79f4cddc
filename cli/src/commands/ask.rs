//! # Handler for `snorelax ask`
//!
//! File: cli/src/commands/ask.rs
//!
//! ## Overview
//!
//! Answers a single message and prints only the reply, so scripts can capture it.
//! The message comes from, in order:
//! 1. the positional arguments, joined with spaces;
//! 2. piped stdin, when stdin is not a terminal (blank input prints nothing);
//! 3. otherwise an interactive session, exactly as `snorelax repl`.
//!
//! ```bash
//! snorelax ask how are you
//! echo "hello" | snorelax ask --engine rules
//! snorelax ask --engine remote "cohere: write me a haiku"
//! ```
//!
use super::repl::run_repl;
use super::session::{ChatSession, Engine};
use crate::core::config::Config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use tracing::debug;

#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The message to answer. Read from stdin when omitted.
    pub message: Vec<String>,
    /// Engine that answers the message.
    #[arg(long, short, value_enum, default_value_t = Engine::Auto)]
    pub engine: Engine,
    /// Do not append the exchange to the chat memory file.
    #[arg(long)]
    pub no_history: bool,
}

pub async fn handle_ask(args: AskArgs, cfg: &Config) -> Result<()> {
    let message = if !args.message.is_empty() {
        args.message.join(" ")
    } else if !io::stdin().is_terminal() {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read message from stdin")?;
        raw
    } else {
        debug!("No message and stdin is a terminal; starting interactive session");
        let mut session = ChatSession::open(cfg, args.engine, !args.no_history)?;
        let stdin = io::stdin();
        return run_repl(&mut session, &mut stdin.lock(), &mut io::stdout()).await;
    };

    let message = message.trim();
    if message.is_empty() {
        debug!("Empty message; nothing to answer");
        return Ok(());
    }

    let mut session = ChatSession::open(cfg, args.engine, !args.no_history)?;
    let reply = session.reply(message).await?;
    println!("{}", reply);
    Ok(())
}
