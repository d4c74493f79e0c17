//! Pipeline lifecycle events and the notifier boundary.
//!
//! In the full product these events land on a UI messaging channel; the
//! core only knows the [`Notifier`] trait. Implementations must be cheap
//! and non-blocking, since the pipeline calls them inline between stages.

use serde::Serialize;

use crate::llm::types::{DebugReport, ProblemInfo, Solution};

/// Everything the pipeline reports to the outside world.
///
/// Serializes with a `type`/`payload` shape so a UI bridge can forward
/// events verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum PipelineEvent {
    /// A solve run (extract → generate) has started.
    SolveStart,
    /// A debug run has started.
    DebugStart,
    /// The active queue had nothing to process. Also the reconciliation
    /// signal after a cancel aborted in-flight work.
    QueueEmpty,
    /// No AI provider is configured; no remote call was attempted.
    ProviderMissing,
    /// Stage 1 of the solve pipeline succeeded.
    ProblemExtracted(ProblemInfo),
    /// Stage 2 of the solve pipeline succeeded; the run is complete.
    SolutionReady(Solution),
    /// Either solve stage failed with the provider's message.
    SolveFailed(String),
    /// The debug run succeeded.
    DebugReady(DebugReport),
    /// The debug run failed with the provider's message.
    DebugFailed(String),
    /// Forwarded untouched from the provider's credits signal.
    OutOfCredits(String),
}

/// Receiver for pipeline lifecycle events.
pub trait Notifier: Send + Sync {
    fn notify(&self, event: PipelineEvent);
}

/// Notifier that writes events to the log. Used by the binary shell;
/// a real UI would forward them to its messaging channel instead.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: PipelineEvent) {
        match &event {
            PipelineEvent::SolveFailed(msg) | PipelineEvent::DebugFailed(msg) => {
                log::error!("[EVENT] {}: {}", discriminant_name(&event), msg)
            }
            _ => log::info!("[EVENT] {}", discriminant_name(&event)),
        }
    }
}

fn discriminant_name(event: &PipelineEvent) -> &'static str {
    match event {
        PipelineEvent::SolveStart => "solve-start",
        PipelineEvent::DebugStart => "debug-start",
        PipelineEvent::QueueEmpty => "queue-empty",
        PipelineEvent::ProviderMissing => "provider-missing",
        PipelineEvent::ProblemExtracted(_) => "problem-extracted",
        PipelineEvent::SolutionReady(_) => "solution-ready",
        PipelineEvent::SolveFailed(_) => "solve-failed",
        PipelineEvent::DebugReady(_) => "debug-ready",
        PipelineEvent::DebugFailed(_) => "debug-failed",
        PipelineEvent::OutOfCredits(_) => "out-of-credits",
    }
}
