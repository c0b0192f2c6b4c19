//! Core data types shared by every part of the dispatch engine.

use tokio::time::Instant;
use uuid::Uuid;

/// A transport-assigned stable handle identifying a connected worker.
pub type WorkerId = Uuid;

/// An `(index, payload)` pair awaiting or undergoing remote computation.
///
/// `index` is the position of the input in the caller's original sequence;
/// `payload` is the opaque, codec-encoded serialized input. Indices are
/// unique within a session and form a dense range `[0, n)`.
#[derive(Debug, Clone)]
pub struct Task {
    pub index: u32,
    pub payload: Vec<u8>,
}

/// A task that has been handed to a worker but not yet resulted or timed
/// out.
///
/// Invariant (enforced by [`crate::state::SessionState`]): at most one
/// `InFlight` entry exists per index at any instant.
#[derive(Debug, Clone)]
pub struct InFlight {
    pub worker_id: WorkerId,
    pub task: Task,
    pub deadline: Instant,
}
