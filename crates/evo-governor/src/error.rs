//! Error types for evo-governor

use thiserror::Error;

/// Rolling quota window that refused a send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaWindow {
    Minute,
    Hour,
    Day,
}

impl QuotaWindow {
    /// Window length in seconds
    pub fn seconds(self) -> i64 {
        match self {
            QuotaWindow::Minute => 60,
            QuotaWindow::Hour => 3_600,
            QuotaWindow::Day => 86_400,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuotaWindow::Minute => "minute",
            QuotaWindow::Hour => "hour",
            QuotaWindow::Day => "day",
        }
    }
}

impl std::fmt::Display for QuotaWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single send did not go through
///
/// `QuotaExceeded` and `OutOfWindow` are refusals with no side effects; the
/// caller may retry later. The other variants are recorded in the history
/// and counted as failures, except `Cancelled`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    #[error("Quota exceeded for the last {window}: {count}/{limit}")]
    QuotaExceeded {
        window: QuotaWindow,
        count: u32,
        limit: u32,
    },

    #[error("Outside the allowed sending window (hour {hour}, sunday: {sunday})")]
    OutOfWindow { hour: u32, sunday: bool },

    #[error("Invalid recipient {recipient}: {reason}")]
    InvalidRecipient { recipient: String, reason: String },

    #[error("Transport failure: {message}")]
    Transport {
        message: String,
        block_suspected: bool,
    },

    #[error("Send cancelled")]
    Cancelled,
}

impl SendError {
    /// Whether the refusal clears up by itself with time
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SendError::QuotaExceeded { .. } | SendError::OutOfWindow { .. }
        )
    }

    /// Whether the error text looked like an account block
    pub fn is_block_suspected(&self) -> bool {
        matches!(
            self,
            SendError::Transport {
                block_suspected: true,
                ..
            }
        )
    }
}

/// Error returned by a `MessageTransport` or `NumberValidator`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for TransportError {
    fn from(message: String) -> Self {
        Self(message)
    }
}

impl From<&str> for TransportError {
    fn from(message: &str) -> Self {
        Self(message.to_string())
    }
}

/// Governor setup and maintenance errors
#[derive(Error, Debug)]
pub enum GovernorError {
    #[error("Invalid governor configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown profile: {0}")]
    UnknownProfile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GovernorError>;
