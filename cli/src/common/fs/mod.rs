//! # SnoRelax Filesystem Utilities
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Shared filesystem helpers. Import from the submodule,
//! e.g. `use crate::common::fs::io::write_string_to_file;`.

/// Contains basic file I/O operations (e.g., `ensure_dir_exists`, `read_optional_to_string`, `write_string_to_file`).
pub mod io;
