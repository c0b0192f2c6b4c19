//! Transport error types.

/// Unified error type for `dispatch-transport`.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The transport or asset listener could not bind its configured port.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias used throughout the transport crate.
pub type Result<T> = std::result::Result<T, TransportError>;
