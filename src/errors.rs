use thiserror::Error;

use crate::backend::BackendError;

/// Error type that captures common administration failures.
#[derive(Debug, Error)]
pub enum GrantError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("Invalid reference: {0}")]
    InvalidRef(String),
}
