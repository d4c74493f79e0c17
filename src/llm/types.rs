//! Solver wire types — ProblemInfo, Solution, DebugReport.
//!
//! The LLM returns JSON that deserializes directly into these types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One queued screenshot materialized for a provider call:
/// the raw PNG bytes plus the content-addressable path they came from.
#[derive(Debug, Clone)]
pub struct ShotPayload {
    pub path: PathBuf,
    pub data: Vec<u8>,
}

/// Structured result of problem extraction (stage 1).
///
/// Held for the rest of the session so debug runs can reference the
/// problem without re-extracting it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemInfo {
    pub problem_statement: String,
    #[serde(default)]
    pub constraints: Vec<String>,
    #[serde(default)]
    pub example_input: Option<String>,
    #[serde(default)]
    pub example_output: Option<String>,
    /// Language the user asked to solve in, echoed through extraction so
    /// the later solve call carries it.
    #[serde(default)]
    pub language: Option<String>,
}

/// A generated solution (stage 2 of the solve pipeline).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    pub code: String,
    #[serde(default)]
    pub thoughts: Vec<String>,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
}

/// Result of a debug run over follow-up screenshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugReport {
    pub new_code: String,
    #[serde(default)]
    pub thoughts: Vec<String>,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
}

/// Failure of a single provider call.
///
/// `OutOfCredits` is kept separate so the pipeline can forward the
/// provider's credits signal untouched instead of wrapping it in a
/// stage error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    #[error("{message}")]
    Remote { message: String },

    #[error("{message}")]
    OutOfCredits { message: String },
}

impl ProviderError {
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Remote { message } | Self::OutOfCredits { message } => message,
        }
    }
}
