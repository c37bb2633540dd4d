//! Error types for schoolcal.

use thiserror::Error;

/// Errors that can occur in schoolcal operations.
#[derive(Error, Debug)]
pub enum SchoolCalError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{provider} error: {message}")]
    Provider { provider: String, message: String },

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SchoolCalError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SchoolCalError::Validation(msg.into())
    }

    /// Wrap any provider-side failure, keeping the full context chain.
    pub fn provider(provider: &str, err: impl std::fmt::Display) -> Self {
        SchoolCalError::Provider {
            provider: provider.to_string(),
            message: format!("{:#}", err),
        }
    }
}

/// Result type alias for schoolcal operations.
pub type SchoolCalResult<T> = Result<T, SchoolCalError>;
