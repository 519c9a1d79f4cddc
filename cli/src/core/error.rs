//! # SnoRelax Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error types used throughout the SnoRelax application.
//! Domain failures get a named variant in `SnorelaxError`; everything else travels
//! as `anyhow::Error` with added context.
//!
//! ## Architecture
//!
//! The error system consists of two main components:
//! - `SnorelaxError`: A custom error enum using `thiserror` for specific error types
//! - `Result<T>`: A type alias for `anyhow::Result<T>` for flexible error handling
//!
//! The error types cover:
//! - Configuration errors
//! - Filesystem and storage errors
//! - Intent classifier errors
//! - Remote provider (Cohere, Hugging Face) errors
//!
//! ## Examples
//!
//! ```rust
//! // Return a specific error type
//! if !path.exists() {
//!     anyhow::bail!(SnorelaxError::Classifier(format!("Model not found: {}", path.display())));
//! }
//!
//! // Check for a specific failure further up
//! match result {
//!     Err(e) if e.downcast_ref::<SnorelaxError>().is_some_and(|se| matches!(se, SnorelaxError::ProviderNotConfigured(_))) => {
//!         println!("No API key, using the placeholder reply");
//!     }
//!     other => other?,
//! }
//! ```
//!
use thiserror::Error;

/// Custom error type for the SnoRelax application.
#[derive(Error, Debug)]
pub enum SnorelaxError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("Intent classifier error: {0}")]
    Classifier(String),

    #[error("Provider '{0}' is not configured (missing API key).")]
    ProviderNotConfigured(String),

    #[error("{provider} request failed with status {status}: {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Storage error: {source}")]
    Storage {
        #[from]
        source: sqlx::Error,
    },

    #[error("HTTP request failed: {source}")]
    Http {
        #[from]
        source: reqwest::Error,
    },

    #[error("Argument parsing error: {0}")]
    ArgumentParsing(String),
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;
