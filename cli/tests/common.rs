//! # SnoRelax CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every command runs
//! inside a `Sandbox`: a temporary working directory, data directory and config
//! home, with provider API keys removed, so tests never touch the developer's
//! real files or reach the network.
//!

#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary home for one test.
pub struct Sandbox {
    root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create sandbox dir");
        std::fs::create_dir_all(root.path().join("work")).expect("Failed to create work dir");
        Self { root }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.path().join("data")
    }

    pub fn work_dir(&self) -> PathBuf {
        self.root.path().join("work")
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir().join(name)
    }

    /// `snorelax` with the sandbox's data dir and a clean environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = snorelax_cmd();
        cmd.current_dir(self.work_dir())
            .env("HOME", self.root.path())
            .env("XDG_CONFIG_HOME", self.root.path().join("config"))
            .env_remove("COHERE_API_KEY")
            .env_remove("HF_API_KEY")
            .env_remove("RUST_LOG")
            .env_remove("SNORELAX_DATA_DIR")
            .arg("--data-dir")
            .arg(self.data_dir());
        cmd
    }
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let raw = std::fs::read_to_string(path).expect("Failed to read JSON file");
    serde_json::from_str(&raw).expect("File is not valid JSON")
}

/// # Get SnoRelax Command (`snorelax_cmd`)
///
/// An `assert_cmd::Command` for the `snorelax` binary built for this test run.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn snorelax_cmd() -> Command {
    Command::cargo_bin("snorelax").expect("Failed to find snorelax binary for testing")
}
