//! Static intents table: tags, example patterns and canned responses.

use crate::bot::classifier::IntentPrediction;
use crate::common::fs::io;
use crate::core::error::{Result, SnorelaxError};
use anyhow::Context;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Reply when no intent clears the error threshold.
pub const UNSURE_REPLY: &str = "I'm not sure I understand. Can you try rephrasing?";
/// Reply when the winning intent has no responses.
pub const NO_RESPONSE_REPLY: &str = "Hmm, I don't know how to respond to that.";

/// Sample table written by `snorelax intents init`.
pub const BUNDLED_INTENTS: &str = include_str!("../../assets/intents.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub tag: String,
    #[serde(default)]
    pub patterns: Vec<String>,
    #[serde(default)]
    pub responses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentsTable {
    pub intents: Vec<Intent>,
}

impl IntentsTable {
    pub fn from_json(raw: &str) -> Result<Self> {
        let table: IntentsTable =
            serde_json::from_str(raw).context("Failed to parse intents JSON")?;
        if let Some(blank) = table.intents.iter().find(|i| i.tag.trim().is_empty()) {
            anyhow::bail!(SnorelaxError::Classifier(format!(
                "Intent with patterns {:?} has an empty tag",
                blank.patterns
            )));
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(SnorelaxError::Classifier(format!(
                "Intents file not found at {}. Run `snorelax intents init` to create a sample.",
                path.display()
            )));
        }
        let raw = io::read_file_to_string(path)?;
        let table = Self::from_json(&raw)
            .with_context(|| format!("Invalid intents file {}", path.display()))?;
        debug!("Loaded {} intents from {}", table.intents.len(), path.display());
        Ok(table)
    }

    pub fn responses_for(&self, tag: &str) -> Option<&[String]> {
        self.intents
            .iter()
            .find(|i| i.tag == tag)
            .map(|i| i.responses.as_slice())
    }

    /// Picks a random response of the best prediction.
    ///
    /// `predictions` must be sorted best first, as `IntentModel::predict` returns them.
    pub fn respond<R: Rng + ?Sized>(&self, predictions: &[IntentPrediction], rng: &mut R) -> String {
        let Some(best) = predictions.first() else {
            return UNSURE_REPLY.to_string();
        };
        self.responses_for(&best.intent)
            .and_then(|responses| responses.choose(rng))
            .cloned()
            .unwrap_or_else(|| NO_RESPONSE_REPLY.to_string())
    }
}
