//! Append-only JSON array files (`chat_memory.json`, `training_data.json`, `moods.json`).

use crate::common::fs::io;
use crate::core::error::Result;
use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A JSON array on disk, rewritten whole on every append.
///
/// Not safe for concurrent writers: callers sharing one file across tasks must
/// serialize `append` themselves (the server holds a mutex for this).
#[derive(Debug, Clone)]
pub struct JsonLog<T> {
    path: PathBuf,
    _entries: PhantomData<T>,
}

impl<T> JsonLog<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _entries: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All entries in append order. A missing or blank file is an empty log.
    pub fn load(&self) -> Result<Vec<T>> {
        let Some(raw) = io::read_optional_to_string(&self.path)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON log {}", self.path.display()))
    }

    /// Appends one entry and returns the new length.
    pub fn append(&self, entry: T) -> Result<usize> {
        let mut entries = self.load()?;
        entries.push(entry);
        let json = serde_json::to_string_pretty(&entries)
            .with_context(|| format!("Failed to serialize {}", self.path.display()))?;
        io::write_string_to_file(&self.path, &json)?;
        debug!("Appended entry #{} to {}", entries.len(), self.path.display());
        Ok(entries.len())
    }
}
