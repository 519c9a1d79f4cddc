//! # SnoRelax Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! Thin wrappers around `std::fs` used by the JSON logs, the intents table and the
//! trained model files. Every failure carries the offending path as context.
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, rejecting paths that exist as files.
//! - **`read_file_to_string`**: `fs::read_to_string` with context.
//! - **`read_optional_to_string`**: like `read_file_to_string`, but a missing file is `Ok(None)`.
//! - **`write_string_to_file`**: creates the parent directory, then writes through a
//!   sibling temp file and a rename so readers never observe a half-written JSON array.
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! io::ensure_dir_exists(Path::new("./data"))?;
//! io::write_string_to_file(Path::new("./data/moods.json"), "[]")?;
//! let raw = io::read_optional_to_string(Path::new("./data/moods.json"))?;
//! ```
//!
use crate::core::error::{Result, SnorelaxError};
use anyhow::Context;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Creates missing parents. Returns `SnorelaxError::FileSystem` if the path
/// already exists but is not a directory.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory {:?}", path))?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(SnorelaxError::FileSystem(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into a string.
pub fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file {:?}", path))
}

/// Reads a file that is allowed to be absent.
///
/// # Returns
///
/// * `Ok(None)` when the file does not exist.
/// * `Ok(Some(content))` otherwise.
pub fn read_optional_to_string(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("File not found, treating as empty: {:?}", path);
            Ok(None)
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read file {:?}", path)),
    }
}

/// Writes string content to a file, overwriting it if it exists.
///
/// The parent directory is created first. Content goes to `<name>.tmp` and is
/// renamed over the target.
pub fn write_string_to_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir_exists(parent)?;
    }

    let mut tmp_name = path
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| SnorelaxError::FileSystem(format!("Not a file path: {:?}", path)))?;
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, content)
        .with_context(|| format!("Failed to write to file {:?}", tmp_path))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move {:?} into place at {:?}", tmp_path, path))?;
    debug!("Wrote content to file: {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensure_dir_exists_creates_new() -> Result<()> {
        let base_dir = tempdir()?;
        let new_dir = base_dir.path().join("new/subdir");
        assert!(!new_dir.exists());
        ensure_dir_exists(&new_dir)?;
        assert!(new_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_already_exists() -> Result<()> {
        let base_dir = tempdir()?;
        let existing_dir = base_dir.path().join("existing");
        fs::create_dir(&existing_dir)?;
        ensure_dir_exists(&existing_dir)?;
        assert!(existing_dir.is_dir());
        Ok(())
    }

    #[test]
    fn test_ensure_dir_exists_path_is_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("a_file.txt");
        fs::write(&file_path, "hello")?;
        let result = ensure_dir_exists(&file_path);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Path exists but is not a directory"));
        Ok(())
    }

    #[test]
    fn test_read_write_string_to_file() -> Result<()> {
        let base_dir = tempdir()?;
        let file_path = base_dir.path().join("nested/chat_memory.json");
        write_string_to_file(&file_path, "[]")?;
        assert!(file_path.exists());
        assert!(!base_dir.path().join("nested/chat_memory.json.tmp").exists());
        assert_eq!(read_file_to_string(&file_path)?, "[]");
        Ok(())
    }

    #[test]
    fn test_read_file_not_found() -> Result<()> {
        let base_dir = tempdir()?;
        let result = read_file_to_string(&base_dir.path().join("nonexistent.txt"));
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn test_read_optional_missing_is_none() -> Result<()> {
        let base_dir = tempdir()?;
        assert!(read_optional_to_string(&base_dir.path().join("missing.json"))?.is_none());
        Ok(())
    }
}
