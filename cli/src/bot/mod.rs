//! # SnoRelax Chatbot Engines (`bot`)
//!
//! File: cli/src/bot/mod.rs
//!
//! ## Overview
//!
//! Every way SnoRelax can turn a message into a reply:
//!
//! - **`rules`**: fixed decision table over the normalized message.
//! - **`intents`** + **`classifier`**: bag-of-words softmax model trained from an
//!   intents table, answering with a random canned response of the winning intent.
//! - **`mood`**: keyword mood detection, also used to tag stored conversations.
//! - **`providers`**: Cohere and Hugging Face HTTP clients.
//! - **`pipeline`**: rule bot, then the remote providers, then a placeholder.
//! - **`guide`**: wellness guide generation from history and moods.
//!
//! `text` holds the normalization and tokenization shared by all of them.
//!
pub mod classifier;
pub mod guide;
pub mod intents;
pub mod mood;
pub mod pipeline;
pub mod providers;
pub mod rules;
pub mod text;
