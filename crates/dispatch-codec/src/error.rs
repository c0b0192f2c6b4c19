//! Codec error types.

/// Unified error type for the payload codec and wire envelope.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// A value could not be serialized into bytes.
    #[error("failed to encode value: {0}")]
    Encode(String),

    /// Bytes could not be deserialized back into a value.
    #[error("failed to decode value: {0}")]
    Decode(String),

    /// The base64 wire envelope was malformed.
    #[error("invalid base64 envelope: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Convenience alias used throughout the codec crate.
pub type Result<T> = std::result::Result<T, CodecError>;
