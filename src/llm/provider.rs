//! Solver provider trait — common interface for the AI backends.
//!
//! The pipeline only sees this trait; the concrete backend (Anthropic
//! today) is injected at construction. Tests inject stubs.

use async_trait::async_trait;

use super::types::{DebugReport, ProblemInfo, ProviderError, ShotPayload, Solution};

/// The three operations the pipeline drives.
///
/// Each call is a single suspension point; implementations own their
/// transport timeouts. A timed-out call surfaces as an ordinary
/// [`ProviderError::Remote`].
#[async_trait]
pub trait SolverProvider: Send + Sync {
    /// Whether the backend has credentials and can be called at all.
    fn is_configured(&self) -> bool;

    /// Stage 1: read the problem out of the queued screenshots.
    async fn extract_problem(
        &self,
        shots: &[ShotPayload],
        language: &str,
    ) -> Result<ProblemInfo, ProviderError>;

    /// Stage 2: generate a solution for an extracted problem.
    async fn generate_solutions(&self, problem: &ProblemInfo)
        -> Result<Solution, ProviderError>;

    /// Debug pass: problem context plus follow-up screenshots of the
    /// user's attempt.
    async fn debug(
        &self,
        problem: &ProblemInfo,
        shots: &[ShotPayload],
    ) -> Result<DebugReport, ProviderError>;
}

/// Check if an API key is present and non-empty in the environment.
pub fn has_env_key(env_key: &str) -> bool {
    std::env::var(env_key).map(|k| !k.is_empty()).unwrap_or(false)
}
