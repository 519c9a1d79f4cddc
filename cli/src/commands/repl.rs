//! # Handler for `snorelax repl`
//!
//! File: cli/src/commands/repl.rs
//!
//! Interactive loop: prints a banner, then answers one line at a time. `exit` (any
//! case) or end of input quits; blank lines are skipped.
//!
use super::session::{ChatSession, Engine};
use crate::common::ui::{self, PromptInput};
use crate::core::config::Config;
use crate::core::error::Result;
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use tracing::info;

#[derive(Parser, Debug)]
pub struct ReplArgs {
    /// Engine that answers messages.
    #[arg(long, short, value_enum, default_value_t = Engine::Auto)]
    pub engine: Engine,
    /// Do not append exchanges to the chat memory file.
    #[arg(long)]
    pub no_history: bool,
}

pub async fn handle_repl(args: ReplArgs, cfg: &Config) -> Result<()> {
    info!("Starting REPL with {:?} engine", args.engine);
    let mut session = ChatSession::open(cfg, args.engine, !args.no_history)?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    run_repl(&mut session, &mut input, &mut output).await
}

/// Drives a session from any line source; used by `repl` and by `ask` on a terminal.
pub async fn run_repl<R: BufRead, W: Write>(
    session: &mut ChatSession,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    writeln!(output, "{}", session.banner()).context("Failed to write banner")?;
    if let Some(hint) = session.hint() {
        writeln!(output, "{}", hint).context("Failed to write banner")?;
    }

    loop {
        match ui::read_prompted_line(input, output, "You: ")? {
            PromptInput::Message(message) => {
                let reply = session.reply(&message).await?;
                writeln!(output, "Bot: {}", reply).context("Failed to write reply")?;
            }
            PromptInput::Blank => continue,
            PromptInput::Exit | PromptInput::Eof => break,
        }
    }
    Ok(())
}
