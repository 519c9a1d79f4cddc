//! # SnoRelax Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! Shared helpers with no chatbot knowledge:
//!
//! - **`fs`**: reading, writing and creating files and directories with contextual errors.
//! - **`ui`**: prompted line input for the interactive chat.
//!

/// Filesystem I/O helpers.
pub mod fs;
/// Terminal prompt helpers.
pub mod ui;
