//! # SnoRelax Command Modules
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! One module per top-level command. Each defines its Clap arguments and an async
//! `handle_*` function taking the parsed arguments and the loaded `Config`.
//!
//! - `ask`: one-shot reply from argv or stdin
//! - `repl`: interactive chat loop
//! - `intents`: intents table and classifier model management
//! - `history`: stored conversations
//! - `mood`: mood detection and mood log
//! - `guide`: wellness guide for a user
//! - `serve`: HTTP chat API
//!
//! `session` is shared by `ask` and `repl`; it is not a command itself.
//!

pub mod ask;
pub mod guide;
pub mod history;
pub mod intents;
pub mod mood;
pub mod repl;
pub mod serve;
/// Engine selection and chat memory shared by `ask` and `repl`.
pub mod session;
