//! # SnoRelax Terminal Prompts
//!
//! File: cli/src/common/ui/mod.rs
//!
//! Line-oriented prompt helpers for the interactive REPL. Reader and writer are
//! generic so the loop can be driven from an in-memory buffer in tests.
//!
use crate::core::error::Result;
use anyhow::Context;
use std::io::{BufRead, Write};

/// What the user typed at a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    /// A non-empty line, trimmed.
    Message(String),
    /// An empty or whitespace-only line.
    Blank,
    /// `exit` in any letter case.
    Exit,
    /// The input stream is closed.
    Eof,
}

/// Writes `prompt`, then reads and classifies one line.
pub fn read_prompted_line<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    prompt: &str,
) -> Result<PromptInput> {
    write!(output, "{}", prompt).context("Failed to write prompt")?;
    output.flush().context("Failed to flush prompt")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input line")?;
    if read == 0 {
        return Ok(PromptInput::Eof);
    }
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() {
        PromptInput::Blank
    } else if trimmed.eq_ignore_ascii_case("exit") {
        PromptInput::Exit
    } else {
        PromptInput::Message(trimmed.to_string())
    })
}
