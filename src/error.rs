//! Unified error types for the MedTrack client.

use thiserror::Error;

/// Unified error type for the MedTrack client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No response was received from the backend.
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    ///
    /// Displays as the bare message so screens can show it verbatim.
    #[error("{message}")]
    Request {
        /// HTTP status code.
        status: u16,
        /// Server-supplied detail, or a generic message.
        message: String,
    },

    /// A success body did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// A caller-supplied header could not be encoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// Durable identity storage failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A path segment cannot be sent as a single URL segment.
    #[error("invalid path segment: {0:?}")]
    InvalidPath(String),

    /// URL composition failed.
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    /// JSON encoding of a request body failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of a request failure, if the backend answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for logging and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Config(_) | ClientError::InvalidConfig(_) => "config",
            ClientError::Network(_) => "network",
            ClientError::Request { .. } => "request",
            ClientError::Parse(_) => "parse",
            ClientError::InvalidHeader(_) => "header",
            ClientError::Storage(_) => "storage",
            ClientError::InvalidPath(_) | ClientError::Url(_) => "url",
            ClientError::Json(_) => "json",
        }
    }
}

/// Errors reading or writing the persisted identity record.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A record exists but does not deserialize to an identity.
    #[error("corrupt identity record: {0}")]
    Corrupt(#[source] serde_json::Error),

    /// Serializing the identity failed.
    #[error("failed to encode identity: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ClientError>;
