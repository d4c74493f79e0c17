//! LLM domain — the solver seam of snapsolve.
//!
//! Public API for the AI layer. External code should only use what is
//! exported here.
//!
//! Providers:
//!   - Anthropic Claude (anthropic.rs)
//!
//! Shared:
//!   - provider.rs — the `SolverProvider` trait + configuration checks
//!   - prompts.rs  — prompt constants and response fence stripping
//!   - types.rs    — wire types the model's JSON deserializes into

mod anthropic;
pub mod prompts;
pub mod provider;
pub mod types;

pub use anthropic::AnthropicSolver;
pub use provider::SolverProvider;
pub use types::{DebugReport, ProblemInfo, ProviderError, ShotPayload, Solution};
