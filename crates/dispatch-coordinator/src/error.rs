//! Coordinator error types, composed from the errors of the crates it wires
//! together.

/// Unified error type for `dispatch-coordinator`.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    #[error(transparent)]
    Codec(#[from] dispatch_codec::CodecError),

    #[error(transparent)]
    Engine(#[from] dispatch_kernel::EngineError),

    #[error(transparent)]
    Transport(#[from] dispatch_transport::TransportError),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Convenience alias used throughout the coordinator crate.
pub type Result<T> = std::result::Result<T, CoordinatorError>;
