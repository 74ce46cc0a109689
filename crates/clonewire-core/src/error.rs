//! Error types for clonewire

use thiserror::Error;

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

/// Error type for encoding, decoding and channel operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodecError {
    /// A `_custom` payload names a tag nobody registered
    #[error("unknown custom type: {0}")]
    UnknownType(String),

    /// A registry entry failed validation
    #[error("invalid registration: {0}")]
    InvalidRegistration(String),

    /// A `_ref` points outside the verbatim table
    #[error("invalid verbatim reference: {0}")]
    InvalidReference(usize),

    /// Tagged input that the encoder could not have produced
    #[error("malformed tagged value: {0}")]
    Malformed(String),

    /// Value has no plain-text representation
    #[error("value is not text representable: {0}")]
    NotTextRepresentable(&'static str),

    /// The host clone refused a value
    #[error("could not clone value: {0}")]
    DataClone(String),

    /// Channel endpoint is closed or its peer is gone
    #[error("channel closed")]
    ChannelClosed,

    /// Function bridging needs a tokio runtime
    #[error("no async runtime available to serve bridged functions")]
    RuntimeUnavailable,

    /// Remote call exceeded its deadline
    #[error("remote call timed out")]
    Timeout,

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl CodecError {
    /// Error name used when this error is relayed as an error value
    pub fn error_name(&self) -> &'static str {
        match self {
            CodecError::UnknownType(_) | CodecError::InvalidRegistration(_) => "TypeError",
            CodecError::InvalidReference(_) => "RangeError",
            CodecError::DataClone(_) => "DataCloneError",
            CodecError::Timeout => "TimeoutError",
            _ => "Error",
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Serialization(err.to_string())
    }
}
