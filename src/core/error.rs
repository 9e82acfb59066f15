//! Error types for tracestack.

use thiserror::Error;

/// Errors raised by tracestack components
#[derive(Error, Debug)]
pub enum TraceStackError {
    /// No application instance id has been registered
    #[error("Application instance id is not registered yet")]
    NotReady,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Segment lookup or fixture failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Bad request argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed textual input
    #[error("Parse error: {message}")]
    Parse {
        /// What failed to parse
        message: String,
    },

    /// I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Socket bind or server failure
    #[error("Network error: {0}")]
    Network(String),

    /// A spawned task panicked or was cancelled
    #[error("Async task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for tracestack operations
pub type Result<T> = std::result::Result<T, TraceStackError>;

impl TraceStackError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }

    /// Creates a new invalid argument error
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Creates a new network error
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }

    /// Creates a new parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Returns true if retrying the failed operation may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotReady | Self::Network(_) | Self::Storage(_))
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotReady => "registration",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
            Self::InvalidArgument(_) => "validation",
            Self::Parse { .. } | Self::Serialization(_) => "serialization",
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Join(_) => "async",
        }
    }
}
