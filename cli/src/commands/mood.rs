//! # Mood Commands (`snorelax mood`)
//!
//! File: cli/src/commands/mood.rs
//!
//! - `detect`: runs the keyword mood analyzer on some text.
//! - `log`: appends a mood entry for a user to `moods.json`.
//! - `list`: prints a user's mood entries.
//!
use crate::bot::mood::detect_mood;
use crate::core::config::Config;
use crate::core::error::{Result, SnorelaxError};
use crate::store::{JsonLog, MoodEntry};
use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
pub struct MoodArgs {
    #[command(subcommand)]
    command: MoodCommand,
}

#[derive(Subcommand, Debug)]
enum MoodCommand {
    /// Detect the mood of a piece of text.
    Detect {
        #[arg(required = true)]
        text: Vec<String>,
        /// Print the full reading as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Record a mood for a user.
    Log {
        /// User the entry belongs to.
        #[arg(long)]
        user: String,
        /// Mood label, e.g. "calm" or "stressed".
        mood: String,
    },
    /// List the moods recorded for a user.
    List {
        #[arg(long)]
        user: String,
    },
}

pub async fn handle_mood(args: MoodArgs, cfg: &Config) -> Result<()> {
    match args.command {
        MoodCommand::Detect { text, json } => {
            let reading = detect_mood(&text.join(" "));
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&reading).context("Failed to encode mood")?
                );
            } else if reading.keywords.is_empty() {
                println!("{}", reading.mood);
            } else {
                println!(
                    "{} (score {}; keywords: {})",
                    reading.mood,
                    reading.score,
                    reading.keywords.join(", ")
                );
            }
            Ok(())
        }
        MoodCommand::Log { user, mood } => {
            if user.trim().is_empty() || mood.trim().is_empty() {
                anyhow::bail!(SnorelaxError::ArgumentParsing(
                    "user and mood must not be empty".into()
                ));
            }
            let log = JsonLog::<MoodEntry>::new(cfg.moods_path());
            let entry = MoodEntry::new(user, mood);
            let total = log.append(entry.clone())?;
            info!("{} now has {} entries", log.path().display(), total);
            println!("Logged {} for {} ({})", entry.mood, entry.user_id, entry.id);
            Ok(())
        }
        MoodCommand::List { user } => {
            let entries = JsonLog::<MoodEntry>::new(cfg.moods_path()).load()?;
            let mut found = false;
            for entry in entries.iter().filter(|e| e.user_id == user) {
                found = true;
                println!("{}\t{}", entry.date, entry.mood);
            }
            if !found {
                println!("No moods recorded for {}.", user);
            }
            Ok(())
        }
    }
}
