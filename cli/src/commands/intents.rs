//! # Intent Classifier Commands (`snorelax intents`)
//!
//! File: cli/src/commands/intents.rs
//!
//! ## Overview
//!
//! - `init`: writes the bundled sample `intents.json` into the data directory.
//! - `train`: trains the bag-of-words model from the intents table and saves it.
//! - `predict`: prints the intents above the error threshold for a sentence.
//! - `list`: shows the tags of the intents table.
//!
//! ```bash
//! snorelax intents init
//! snorelax intents train --epochs 300
//! snorelax intents predict "I can't sleep at night"
//! ```
//!
use crate::bot::classifier::{IntentModel, TrainingOptions};
use crate::bot::intents::{IntentsTable, BUNDLED_INTENTS};
use crate::common::fs::io;
use crate::core::config::Config;
use crate::core::error::{Result, SnorelaxError};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
pub struct IntentsArgs {
    #[command(subcommand)]
    command: IntentsCommand,
}

#[derive(Subcommand, Debug)]
enum IntentsCommand {
    /// Write the sample intents table to the data directory.
    Init {
        /// Replace an existing intents file.
        #[arg(long)]
        force: bool,
    },
    /// Train the classifier and save the model.
    Train {
        /// Passes over the training patterns (default from config).
        #[arg(long)]
        epochs: Option<usize>,
        /// SGD step size (default from config).
        #[arg(long)]
        learning_rate: Option<f32>,
        /// Shuffle seed (default from config).
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Show the intents a sentence is classified as.
    Predict {
        /// Sentence to classify.
        #[arg(required = true)]
        sentence: Vec<String>,
        /// Minimum probability to report (default from config).
        #[arg(long)]
        threshold: Option<f32>,
    },
    /// List the intents in the table.
    List,
}

pub async fn handle_intents(args: IntentsArgs, cfg: &Config) -> Result<()> {
    match args.command {
        IntentsCommand::Init { force } => init(cfg, force),
        IntentsCommand::Train {
            epochs,
            learning_rate,
            seed,
        } => {
            let options = TrainingOptions {
                epochs: epochs.unwrap_or(cfg.classifier.epochs),
                learning_rate: learning_rate.unwrap_or(cfg.classifier.learning_rate),
                seed: seed.unwrap_or(cfg.classifier.seed),
            };
            train(cfg, &options)
        }
        IntentsCommand::Predict {
            sentence,
            threshold,
        } => predict(
            cfg,
            &sentence.join(" "),
            threshold.unwrap_or(cfg.classifier.error_threshold),
        ),
        IntentsCommand::List => list(cfg),
    }
}

fn init(cfg: &Config, force: bool) -> Result<()> {
    let path = cfg.intents_path();
    if path.exists() && !force {
        anyhow::bail!(SnorelaxError::FileSystem(format!(
            "{} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }
    io::write_string_to_file(&path, BUNDLED_INTENTS)?;
    println!("Wrote sample intents to {}", path.display());
    Ok(())
}

fn train(cfg: &Config, options: &TrainingOptions) -> Result<()> {
    if options.epochs == 0 || options.learning_rate <= 0.0 {
        anyhow::bail!(SnorelaxError::ArgumentParsing(
            "--epochs and --learning-rate must be positive".into()
        ));
    }
    let table = IntentsTable::load(&cfg.intents_path())?;
    info!("Training intent model with {:?}", options);
    let (model, report) = IntentModel::train(&table, options)?;
    let model_path = cfg.model_path();
    model.save(&model_path)?;

    println!(
        "Trained on {} patterns: {} words, {} intents.",
        report.examples, report.vocabulary, report.classes
    );
    println!(
        "Final loss {:.4}, training accuracy {:.1}%.",
        report.final_loss,
        report.accuracy * 100.0
    );
    println!("Model saved to {}", model_path.display());
    Ok(())
}

fn predict(cfg: &Config, sentence: &str, threshold: f32) -> Result<()> {
    if !(0.0..1.0).contains(&threshold) {
        anyhow::bail!(SnorelaxError::ArgumentParsing(format!(
            "--threshold must be in [0, 1), got {}",
            threshold
        )));
    }
    let model = IntentModel::load(&cfg.model_path())?;
    let predictions = model.predict(sentence, threshold);
    if predictions.is_empty() {
        println!("No intent above threshold {}.", threshold);
        return Ok(());
    }
    for prediction in predictions {
        println!("{}\t{:.4}", prediction.intent, prediction.probability);
    }
    Ok(())
}

fn list(cfg: &Config) -> Result<()> {
    let table = IntentsTable::load(&cfg.intents_path())?;
    for intent in &table.intents {
        println!(
            "{}\t{} patterns\t{} responses",
            intent.tag,
            intent.patterns.len(),
            intent.responses.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::session::tests::config_in;
    use tempfile::TempDir;

    #[test]
    fn test_parses_train_overrides() {
        let args = IntentsArgs::try_parse_from(["intents", "train", "--epochs", "50", "--seed", "3"])
            .unwrap();
        match args.command {
            IntentsCommand::Train {
                epochs,
                learning_rate,
                seed,
            } => {
                assert_eq!(epochs, Some(50));
                assert_eq!(learning_rate, None);
                assert_eq!(seed, Some(3));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_predict_requires_sentence() {
        assert!(IntentsArgs::try_parse_from(["intents", "predict"]).is_err());
    }

    #[test]
    fn test_init_then_train_writes_model() -> Result<()> {
        let dir = TempDir::new()?;
        let cfg = config_in(&dir);

        init(&cfg, false)?;
        assert!(init(&cfg, false).is_err());
        init(&cfg, true)?;

        let options = TrainingOptions {
            epochs: 50,
            learning_rate: 0.1,
            seed: 1,
        };
        train(&cfg, &options)?;
        let model = IntentModel::load(&cfg.model_path())?;
        assert!(model.classes.contains(&"greeting".to_string()));
        Ok(())
    }
}
