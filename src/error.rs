//! Error types for ohpack

use thiserror::Error;

/// Result type alias for ohpack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ohpack
#[derive(Error, Debug)]
pub enum Error {
    /// Required command-line arguments are missing
    #[error("Usage error: {0}")]
    Usage(String),

    /// A required source attribute is absent
    #[error("Missing metadata: attribute '{name}' not found on source dataset")]
    MissingMetadata { name: String },

    /// Source descriptor or layout is degenerate
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Source container or dataset cannot be opened
    #[error("Failed to open source: {0}")]
    SourceOpen(String),

    /// Destination exists or cannot be created
    #[error("Failed to create sink: {0}")]
    SinkCreate(String),

    /// Post-population metadata write failed
    #[error("Failed to write attribute '{name}': {reason}")]
    AttributeWrite { name: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed container bytes
    #[error("Format error: {0}")]
    Format(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Invalid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Initialization error
    #[error("Initialization error: {0}")]
    Init(String),
}

impl Error {
    /// Create a usage error
    pub fn usage<S: Into<String>>(msg: S) -> Self {
        Error::Usage(msg.into())
    }

    /// Create a missing metadata error
    pub fn missing_metadata<S: Into<String>>(name: S) -> Self {
        Error::MissingMetadata { name: name.into() }
    }

    /// Create an invalid dimensions error
    pub fn invalid_dimensions<S: Into<String>>(msg: S) -> Self {
        Error::InvalidDimensions(msg.into())
    }

    /// Create a source open error
    pub fn source_open<S: Into<String>>(msg: S) -> Self {
        Error::SourceOpen(msg.into())
    }

    /// Create a sink creation error
    pub fn sink_create<S: Into<String>>(msg: S) -> Self {
        Error::SinkCreate(msg.into())
    }

    /// Create an attribute write error
    pub fn attribute_write<N: Into<String>, S: Into<String>>(name: N, reason: S) -> Self {
        Error::AttributeWrite {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a format error
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an invalid state error
    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Error::InvalidState(msg.into())
    }
}
