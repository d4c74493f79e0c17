//! Error taxonomy for the capture, storage, and pipeline domains.
//!
//! Every failure here is local to one operation or one pipeline run;
//! nothing in this crate is fatal to the process.

use thiserror::Error;

/// Failures while grabbing pixels from the screen.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("screen capture failed: {message}")]
    Screen { message: String },

    #[error("no monitor available to capture")]
    NoMonitor,

    #[error("PNG encode failed: {message}")]
    Encode { message: String },

    #[error("failed to store capture: {0}")]
    Store(#[from] StoreError),
}

/// Failures in the on-disk screenshot store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("screenshot not found: {path}")]
    NotFound { path: String },

    #[error("screenshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal failures of a pipeline run.
///
/// An empty queue and a cancelled run are outcomes, not errors; see
/// [`crate::pipeline::RunOutcome`].
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no AI provider configured — set ANTHROPIC_API_KEY")]
    ProviderNotConfigured,

    #[error("no extracted problem to debug against — run the solve pipeline first")]
    MissingProblem,

    #[error("could not load a queued screenshot: {0}")]
    Read(#[from] StoreError),

    #[error("problem extraction failed: {message}")]
    Extraction { message: String },

    #[error("solution generation failed: {message}")]
    Generation { message: String },

    #[error("debug analysis failed: {message}")]
    Debug { message: String },

    #[error("out of credits: {message}")]
    OutOfCredits { message: String },
}
