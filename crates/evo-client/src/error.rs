//! Error types for evo-client

use thiserror::Error;

/// evo-client error type
#[derive(Error, Debug)]
pub enum EvolutionError {
    /// The gateway answered with a status of 400 or above
    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Governor error: {0}")]
    Governor(#[from] evo_governor::GovernorError),

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),
}

impl EvolutionError {
    /// HTTP status for API errors
    pub fn status(&self) -> Option<u16> {
        match self {
            EvolutionError::Api { status, .. } => Some(*status),
            EvolutionError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<EvolutionError> for evo_governor::TransportError {
    fn from(err: EvolutionError) -> Self {
        evo_governor::TransportError::new(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, EvolutionError>;
