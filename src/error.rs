//! Error handling and custom error types
//!
//! Provides unified error handling across the crate using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// No API key configured for the provider that was asked to generate.
    #[error("{0}")]
    MissingCredential(String),

    /// Transport failure, non-success HTTP status or an empty completion.
    #[error("{0}")]
    AiProvider(String),

    /// Provider text could not be turned into a list of prompts. The payload
    /// carries the diagnostic detail; the user-facing message is generic.
    #[error("The AI returned an unexpected format. Please try again.")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
