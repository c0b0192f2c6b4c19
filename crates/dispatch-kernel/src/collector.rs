//! Result Collector (§4.4).
//!
//! A handful of free functions over [`SessionState`] rather than their own
//! struct: the collector has no state of its own beyond what the Dispatch
//! Engine already owns, so giving it a type would just be an empty wrapper.
//! It is kept in its own module because the specification treats it as a
//! distinct component with its own invariants.

use crate::state::SessionState;
use crate::task::WorkerId;

/// What happened when a `result` message was applied to session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultOutcome {
    /// The index had a matching in-flight entry; it is now completed.
    Recorded,
    /// No in-flight entry existed for this index -- a late duplicate or a
    /// result for an already-completed index. Dropped, per §4.4 step 1 and
    /// the Duplicate Drop law (§8).
    Dropped,
}

/// Apply a `result(worker, (index, payload))` message to session state.
///
/// Returns [`ResultOutcome::Recorded`] and, when the owning worker has no
/// other in-flight task, whether it should be re-enqueued as ready --
/// callers use this to drive [`SessionState::enqueue_ready`] without the
/// collector needing to know about the ready queue's dedup rule itself.
pub fn apply_result(
    state: &mut SessionState,
    worker_id: WorkerId,
    index: u32,
    payload: Vec<u8>,
) -> (ResultOutcome, bool) {
    if state.in_flight.remove(&index).is_none() {
        return (ResultOutcome::Dropped, false);
    }

    let worker_now_idle = !state.worker_is_busy(worker_id);
    state.completed.insert(index, payload);

    (ResultOutcome::Recorded, worker_now_idle)
}
