//! Error types for the ambient operations around the resolver.
//!
//! Responsibilities:
//! - Define error variants for env file loading and store construction.
//!
//! Does NOT handle:
//! - Resolution failures. Every lookup stage yields absence instead of an error.
//!
//! Invariants:
//! - Dotenv errors NEVER include raw env file line contents to prevent secret leakage.
//! - All variants carry enough context (paths, positions) for debugging.

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading env files or building a config store.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The env file has invalid syntax.
    ///
    /// SAFETY: only the byte index of the failure is reported, never the line.
    #[error(
        "Failed to parse env file {path} at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip env file loading"
    )]
    DotenvParse { path: PathBuf, error_index: usize },

    #[error("Failed to read env file {path}: {kind}")]
    DotenvIo { path: PathBuf, kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load env file {path}. Hint: set DOTENV_DISABLED=1 to skip env file loading")]
    DotenvUnknown { path: PathBuf },

    #[error("Unable to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Failed to parse config store document: {0}")]
    StoreParse(#[from] serde_json::Error),

    #[error("Invalid config store document: {0}")]
    StoreShape(String),
}
