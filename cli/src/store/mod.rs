//! # SnoRelax Persistence (`store`)
//!
//! File: cli/src/store/mod.rs
//!
//! ## Overview
//!
//! Two kinds of storage back the chatbot:
//! - **`json_log`**: flat JSON arrays on disk (`chat_memory.json`, `training_data.json`,
//!   `moods.json`). Every append rewrites the whole file.
//! - **`collection`**: an embedded SQLite database holding per-user `Conversation`
//!   documents with a derived mood and duplicate-message suppression.
//!
//! Record types shared by both live in `records`.
//!
pub mod collection;
pub mod json_log;
pub mod records;

pub use collection::ChatCollection;
pub use json_log::JsonLog;
pub use records::{ChatRecord, Conversation, MoodEntry, TrainingEntry};
