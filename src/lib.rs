//! snapsolve — screenshot queue + cancellable AI pipeline core.
//!
//! This crate is the engine of a desktop coding assistant: capture
//! screenshots of a programming problem into bounded queues, then drive
//! them through a two-stage AI pipeline (extract the problem, generate
//! a solution) or a one-stage debug pass over follow-up shots, with
//! cooperative cancellation at every stage.
//!
//! No UI lives here. The window layer, hotkeys, and rendering are
//! collaborators behind three seams:
//!   - `capture::CaptureProvider` — turns a capture request into PNG bytes
//!   - `llm::SolverProvider`      — the three AI operations
//!   - `events::Notifier`         — receives pipeline lifecycle events
//!
//! `main.rs` is a thin shell that wires real implementations to a stdin
//! command loop; everything else is library code.

pub mod capture;
pub mod error;
pub mod events;
pub mod llm;
pub mod pipeline;
pub mod queue;
pub mod store;

pub use error::{CaptureError, PipelineError, StoreError};
pub use events::{LogNotifier, Notifier, PipelineEvent};
pub use pipeline::{PipelineController, RunOutcome};
pub use queue::{Mode, QueueKind, QueueManager, DEFAULT_QUEUE_CAPACITY};
pub use store::ShotStore;
