//! Bag-of-words intent classifier.
//!
//! Patterns are tokenized and lemmatized into a sorted vocabulary. Each sentence
//! becomes a 0/1 vector over that vocabulary, fed through a single dense layer
//! and a softmax. Training is plain per-example SGD on cross-entropy.

use crate::bot::intents::IntentsTable;
use crate::bot::text::{lemmatize, lemmatized_tokens, tokenize};
use crate::common::fs::io;
use crate::core::error::{Result, SnorelaxError};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

/// Dense layer: `out = W * in + b`, weights row-major `out_dim x in_dim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dense {
    pub in_dim: usize,
    pub out_dim: usize,
    pub weights: Vec<f32>,
    pub bias: Vec<f32>,
}

impl Dense {
    pub fn zeros(in_dim: usize, out_dim: usize) -> Self {
        Self {
            in_dim,
            out_dim,
            weights: vec![0.0; in_dim * out_dim],
            bias: vec![0.0; out_dim],
        }
    }

    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        (0..self.out_dim)
            .map(|o| {
                let row = &self.weights[o * self.in_dim..(o + 1) * self.in_dim];
                row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + self.bias[o]
            })
            .collect()
    }

    /// Applies `grad[o] * input` to every row, scaled by `-learning_rate`.
    fn step(&mut self, input: &[f32], grad: &[f32], learning_rate: f32) {
        for (o, g) in grad.iter().enumerate() {
            self.bias[o] -= learning_rate * g;
            let row = &mut self.weights[o * self.in_dim..(o + 1) * self.in_dim];
            for (w, x) in row.iter_mut().zip(input) {
                if *x != 0.0 {
                    *w -= learning_rate * g * x;
                }
            }
        }
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentPrediction {
    pub intent: String,
    pub probability: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct TrainingOptions {
    pub epochs: usize,
    pub learning_rate: f32,
    pub seed: u64,
}

#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub examples: usize,
    pub vocabulary: usize,
    pub classes: usize,
    /// Mean cross-entropy over the last epoch.
    pub final_loss: f32,
    /// Share of training patterns classified correctly after training.
    pub accuracy: f32,
}

/// Saved as `{vocabulary, classes, in_dim, out_dim, weights, bias, trained_at}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentModel {
    pub vocabulary: Vec<String>,
    pub classes: Vec<String>,
    #[serde(flatten)]
    pub layer: Dense,
    pub trained_at: DateTime<Utc>,
}

impl IntentModel {
    pub fn train(table: &IntentsTable, options: &TrainingOptions) -> Result<(Self, TrainingReport)> {
        let mut vocabulary = BTreeSet::new();
        let mut classes = BTreeSet::new();
        let mut documents: Vec<(Vec<String>, &str)> = Vec::new();

        for intent in &table.intents {
            for pattern in &intent.patterns {
                let tokens = tokenize(pattern);
                vocabulary.extend(
                    tokens
                        .iter()
                        .filter(|t| t.chars().all(char::is_alphabetic))
                        .map(|t| lemmatize(t)),
                );
                documents.push((tokens.iter().map(|t| lemmatize(t)).collect(), &intent.tag));
                classes.insert(intent.tag.clone());
            }
        }

        if documents.is_empty() {
            anyhow::bail!(SnorelaxError::Classifier(
                "The intents table has no patterns to train on".to_string()
            ));
        }
        if vocabulary.is_empty() {
            anyhow::bail!(SnorelaxError::Classifier(
                "The intents patterns contain no alphabetic words".to_string()
            ));
        }

        let vocabulary: Vec<String> = vocabulary.into_iter().collect();
        let classes: Vec<String> = classes.into_iter().collect();
        let mut model = IntentModel {
            layer: Dense::zeros(vocabulary.len(), classes.len()),
            vocabulary,
            classes,
            trained_at: Utc::now(),
        };

        let examples: Vec<(Vec<f32>, usize)> = documents
            .iter()
            .map(|(words, tag)| {
                let target = model
                    .classes
                    .iter()
                    .position(|c| c.as_str() == *tag)
                    .unwrap_or_default();
                (model.encode(words), target)
            })
            .collect();

        info!(
            "Training on {} patterns, {} words, {} intents",
            examples.len(),
            model.vocabulary.len(),
            model.classes.len()
        );

        let mut rng = StdRng::seed_from_u64(options.seed);
        let mut order: Vec<usize> = (0..examples.len()).collect();
        let mut final_loss = 0.0;
        for epoch in 0..options.epochs {
            order.shuffle(&mut rng);
            let mut loss = 0.0;
            for &i in &order {
                let (x, target) = &examples[i];
                let mut grad = softmax(&model.layer.forward(x));
                loss -= grad[*target].max(f32::MIN_POSITIVE).ln();
                grad[*target] -= 1.0;
                model.layer.step(x, &grad, options.learning_rate);
            }
            final_loss = loss / examples.len() as f32;
            if epoch % 50 == 0 {
                debug!("epoch {} loss {:.4}", epoch, final_loss);
            }
        }

        let correct = examples
            .iter()
            .filter(|(x, target)| argmax(&softmax(&model.layer.forward(x))) == Some(*target))
            .count();
        let report = TrainingReport {
            examples: examples.len(),
            vocabulary: model.vocabulary.len(),
            classes: model.classes.len(),
            final_loss,
            accuracy: correct as f32 / examples.len() as f32,
        };
        Ok((model, report))
    }

    fn encode(&self, words: &[String]) -> Vec<f32> {
        self.vocabulary
            .iter()
            .map(|v| if words.contains(v) { 1.0 } else { 0.0 })
            .collect()
    }

    /// 0/1 presence vector of the sentence over the vocabulary.
    pub fn bag_of_words(&self, sentence: &str) -> Vec<f32> {
        self.encode(&lemmatized_tokens(sentence))
    }

    /// Intents above `threshold`, most probable first.
    ///
    /// A sentence sharing no word with the vocabulary predicts nothing, rather
    /// than echoing the class priors learned in the bias.
    pub fn predict(&self, sentence: &str, threshold: f32) -> Vec<IntentPrediction> {
        let bag = self.bag_of_words(sentence);
        if bag.iter().all(|&b| b == 0.0) {
            debug!("No known words in {:?}", sentence);
            return Vec::new();
        }
        let probabilities = softmax(&self.layer.forward(&bag));
        let mut predictions: Vec<IntentPrediction> = probabilities
            .into_iter()
            .enumerate()
            .filter(|(_, p)| *p > threshold)
            .map(|(i, p)| IntentPrediction {
                intent: self.classes[i].clone(),
                probability: p,
            })
            .collect();
        predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        predictions
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string(self).context("Failed to serialize intent model")?;
        io::write_string_to_file(path, &json)?;
        info!("Saved intent model to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(SnorelaxError::Classifier(format!(
                "No trained model at {}. Run `snorelax intents train` first.",
                path.display()
            )));
        }
        let raw = io::read_file_to_string(path)?;
        let model: IntentModel = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse intent model {}", path.display()))?;
        let layer = &model.layer;
        if layer.in_dim != model.vocabulary.len()
            || layer.out_dim != model.classes.len()
            || layer.weights.len() != layer.in_dim * layer.out_dim
            || layer.bias.len() != layer.out_dim
        {
            anyhow::bail!(SnorelaxError::Classifier(format!(
                "Intent model {} has inconsistent dimensions",
                path.display()
            )));
        }
        Ok(model)
    }
}

fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> IntentsTable {
        IntentsTable::from_json(
            r#"{"intents": [
                {"tag": "greeting", "patterns": ["Hi", "Hello", "Hey there", "Good morning"], "responses": ["Hello!"]},
                {"tag": "goodbye", "patterns": ["Bye", "See you later", "Goodbye"], "responses": ["Bye!"]},
                {"tag": "thanks", "patterns": ["Thanks", "Thank you", "That's helpful"], "responses": ["Welcome!"]}
            ]}"#,
        )
        .unwrap()
    }

    fn options() -> TrainingOptions {
        TrainingOptions {
            epochs: 200,
            learning_rate: 0.1,
            seed: 42,
        }
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0, 1000.0]);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(probs[3] > 0.99);
    }

    #[test]
    fn test_dense_forward() {
        let layer = Dense {
            in_dim: 2,
            out_dim: 2,
            weights: vec![1.0, 2.0, 3.0, 4.0],
            bias: vec![0.5, -0.5],
        };
        assert_eq!(layer.forward(&[1.0, 1.0]), vec![3.5, 6.5]);
    }

    #[test]
    fn test_vocabulary_is_sorted_lemmatized_and_alphabetic() {
        let (model, report) = IntentModel::train(&table(), &options()).unwrap();
        assert_eq!(model.classes, vec!["goodbye", "greeting", "thanks"]);
        assert!(model.vocabulary.windows(2).all(|w| w[0] < w[1]));
        assert!(model.vocabulary.contains(&"thank".to_string()));
        assert!(!model.vocabulary.contains(&"thanks".to_string()));
        assert_eq!(report.examples, 10);
        assert_eq!(report.vocabulary, model.vocabulary.len());
    }

    #[test]
    fn test_bag_of_words() {
        let (model, _) = IntentModel::train(&table(), &options()).unwrap();
        let bag = model.bag_of_words("Hello, hello and thanks!");
        assert_eq!(bag.len(), model.vocabulary.len());
        assert_eq!(bag.iter().filter(|&&b| b == 1.0).count(), 2);
        let hello = model.vocabulary.iter().position(|w| w == "hello").unwrap();
        assert_eq!(bag[hello], 1.0);
    }

    #[test]
    fn test_training_learns_the_patterns() {
        let (model, report) = IntentModel::train(&table(), &options()).unwrap();
        assert_eq!(report.accuracy, 1.0);

        let predictions = model.predict("hello", 0.25);
        assert_eq!(predictions[0].intent, "greeting");
        assert!(predictions[0].probability > 0.5);
        assert_eq!(model.predict("see you later", 0.25)[0].intent, "goodbye");
        assert_eq!(model.predict("thank you so much", 0.25)[0].intent, "thanks");
    }

    #[test]
    fn test_predictions_sorted_and_above_threshold() {
        let (model, _) = IntentModel::train(&table(), &options()).unwrap();
        let predictions = model.predict("hello bye", 0.01);
        assert!(predictions.windows(2).all(|w| w[0].probability >= w[1].probability));
        assert!(predictions.iter().all(|p| p.probability > 0.01));
    }

    #[test]
    fn test_unknown_words_predict_nothing() {
        let (model, _) = IntentModel::train(&table(), &options()).unwrap();
        assert!(model.predict("quantum chromodynamics", 0.25).is_empty());
    }

    #[test]
    fn test_training_is_reproducible() {
        let (a, _) = IntentModel::train(&table(), &options()).unwrap();
        let (b, _) = IntentModel::train(&table(), &options()).unwrap();
        assert_eq!(a.layer, b.layer);
    }

    #[test]
    fn test_empty_table_rejected() {
        let empty = IntentsTable { intents: vec![] };
        let err = IntentModel::train(&empty, &options()).unwrap_err();
        assert!(err.to_string().contains("no patterns"));
    }

    #[test]
    fn test_save_and_load() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.json");
        let (model, _) = IntentModel::train(&table(), &options())?;
        model.save(&path)?;
        let loaded = IntentModel::load(&path)?;
        assert_eq!(loaded.vocabulary, model.vocabulary);
        assert_eq!(loaded.classes, model.classes);
        assert!(loaded
            .layer
            .weights
            .iter()
            .zip(&model.layer.weights)
            .all(|(a, b)| (a - b).abs() < 1e-6));
        assert_eq!(
            loaded.predict("hello", 0.25)[0].intent,
            model.predict("hello", 0.25)[0].intent
        );
        Ok(())
    }

    #[test]
    fn test_saved_model_layout() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("model.json");
        let (model, _) = IntentModel::train(&table(), &options())?;
        model.save(&path)?;
        let saved: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        let keys: Vec<&str> = saved.as_object().unwrap().keys().map(String::as_str).collect();
        for key in ["vocabulary", "classes", "weights", "bias", "trained_at"] {
            assert!(keys.contains(&key), "missing {key} in {keys:?}");
        }
        assert!(saved.get("layer").is_none());
        assert_eq!(
            saved["weights"].as_array().unwrap().len(),
            model.vocabulary.len() * model.classes.len()
        );
        Ok(())
    }

    #[test]
    fn test_load_missing_model() {
        let dir = tempdir().unwrap();
        let err = IntentModel::load(&dir.path().join("none.json")).unwrap_err();
        assert!(err.to_string().contains("snorelax intents train"));
    }
}
