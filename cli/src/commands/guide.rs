//! # Handler for `snorelax guide`
//!
//! File: cli/src/commands/guide.rs
//!
//! Builds a wellness guide for one user from the stored conversations and mood log
//! and prints it as JSON.
//!
use crate::bot::guide::{build_guide, GuideInput, HISTORY_WINDOW};
use crate::bot::providers::Providers;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::store::{ChatCollection, JsonLog, MoodEntry};
use anyhow::Context;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
pub struct GuideArgs {
    /// User to build the guide for.
    #[arg(long)]
    pub user: String,
    /// Skip Cohere even when a key is configured.
    #[arg(long)]
    pub local: bool,
}

pub async fn handle_guide(args: GuideArgs, cfg: &Config) -> Result<()> {
    let collection = ChatCollection::open(&cfg.database_path()).await?;
    let history = collection.recent_by_user(&args.user, HISTORY_WINDOW).await?;
    let moods = JsonLog::<MoodEntry>::new(cfg.moods_path()).load()?;
    let input = GuideInput::new(history, &moods, &args.user);
    info!(
        "Building guide for {} from {} conversations and {} moods",
        args.user,
        input.history.len(),
        input.moods.len()
    );

    let providers = if args.local {
        Providers::default()
    } else {
        Providers::from_env(&cfg.providers)?
    };
    let guide = build_guide(providers.cohere.as_ref(), &input).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&guide).context("Failed to encode guide")?
    );
    Ok(())
}
