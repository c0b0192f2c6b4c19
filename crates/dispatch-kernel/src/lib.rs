//! Transport-agnostic task dispatch engine.
//!
//! `dispatch-kernel` implements the Dispatch Engine, Worker Registry, and
//! Result Collector described by the specification: the part of the system
//! that decides which worker gets which task and when a task is considered
//! done. It knows nothing about sockets, HTTP, or wire formats -- those are
//! reached only through the [`sink::TaskSink`] trait injected at
//! construction, the same dependency-injection seam the corpus uses to keep
//! its kernel free of any particular tool adapter.

pub mod collector;
pub mod engine;
pub mod error;
pub mod progress;
pub mod registry;
pub mod sink;
pub mod state;
pub mod task;

pub use collector::ResultOutcome;
pub use engine::{DispatchEngine, EngineConfig};
pub use error::{EngineError, Result};
pub use progress::{Progress, ProgressBus};
pub use registry::{WorkerInfo, WorkerRegistry, WorkerState};
pub use sink::TaskSink;
pub use task::{InFlight, Task, WorkerId};
