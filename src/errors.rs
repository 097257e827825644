// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TsgateError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A required external tool could not be found on any candidate path.
    #[error("{tool} not found. Please install it with: {hint}")]
    CollaboratorUnavailable { tool: String, hint: String },

    /// The external tool ran but could not produce a usable result.
    #[error("{tool} failed: {message}")]
    CollaboratorFailure { tool: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TsgateError>;
