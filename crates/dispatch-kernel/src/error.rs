//! Kernel error types.
//!
//! All dispatch-kernel subsystems surface errors through [`EngineError`],
//! the single error type returned by every fallible public API in this
//! crate.

/// Unified error type for the dispatch engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A session is already running; `map` cannot be called concurrently on
    /// the same engine.
    #[error("a dispatch session is already active")]
    SessionAlreadyActive,

    /// `max_attempts` was configured and a task exceeded it.
    ///
    /// This is the only way the engine itself aborts a session instead of
    /// retrying forever -- see the `max_attempts` REDESIGN FLAG.
    #[error("task {index} exceeded the retry limit of {max_attempts} attempts")]
    RetryLimitExceeded {
        /// The task index that kept timing out.
        index: u32,
        /// The configured retry budget that was exceeded.
        max_attempts: u32,
    },

    /// The session was cancelled before every task completed.
    #[error("dispatch session was cancelled")]
    Cancelled,
}

/// Convenience alias used throughout the kernel crate.
pub type Result<T> = std::result::Result<T, EngineError>;
