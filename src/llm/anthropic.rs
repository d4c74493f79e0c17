//! Anthropic solver — non-streaming Messages API calls.
//!
//! All three pipeline operations go through the same request shape:
//! system prompt + one user message whose content mixes text and
//! base64 PNG image blocks. The user already triggered processing and
//! expects a wait, so nothing here streams.

use async_trait::async_trait;
use base64::Engine as _;
use serde::de::DeserializeOwned;

use super::prompts::{
    self, DEBUG_MAX_TOKENS, DEBUG_SYSTEM_PROMPT, EXTRACT_MAX_TOKENS, EXTRACT_SYSTEM_PROMPT,
    MODEL, SOLVE_MAX_TOKENS, SOLVE_SYSTEM_PROMPT,
};
use super::provider::{has_env_key, SolverProvider};
use super::types::{DebugReport, ProblemInfo, ProviderError, ShotPayload, Solution};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Upper bound on a single provider call. The pipeline treats a timeout
/// as an ordinary remote failure.
const CALL_TIMEOUT_SECS: u64 = 120;

pub struct AnthropicSolver {
    client: reqwest::Client,
}

impl AnthropicSolver {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(CALL_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// One Messages API round-trip: send, check status, pull the text block.
    async fn call(
        &self,
        system: &str,
        max_tokens: u32,
        content: serde_json::Value,
    ) -> Result<String, ProviderError> {
        let api_key = match std::env::var(API_KEY_ENV) {
            Ok(k) if !k.is_empty() => k,
            _ => {
                return Err(ProviderError::remote(
                    "No API key configured. Set ANTHROPIC_API_KEY.",
                ))
            }
        };

        let start = std::time::Instant::now();
        let resp = self
            .client
            .post(API_URL)
            .header("x-api-key", &api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&serde_json::json!({
                "model": MODEL,
                "max_tokens": max_tokens,
                "system": system,
                "messages": [{"role": "user", "content": content}]
            }))
            .send()
            .await
            .map_err(|e| {
                log::error!("[LLM] API request failed: {}", e);
                ProviderError::remote(format!("API request failed: {}", e))
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            ProviderError::remote(format!("Failed to read API response: {}", e))
        })?;

        if !status.is_success() {
            log::error!("[LLM] API returned {}: {}", status, &body[..200.min(body.len())]);
            if status.as_u16() == 402 || body.contains("credit balance") {
                return Err(ProviderError::OutOfCredits {
                    message: extract_api_error(&body)
                        .unwrap_or_else(|| "Your credit balance is too low".to_string()),
                });
            }
            let detail = extract_api_error(&body).unwrap_or_else(|| format!("API error ({})", status));
            return Err(ProviderError::remote(detail));
        }

        log::info!("[LLM] Response in {}ms ({} bytes)", start.elapsed().as_millis(), body.len());

        extract_anthropic_text(&body)
            .ok_or_else(|| ProviderError::remote("Could not parse LLM response"))
    }
}

impl Default for AnthropicSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SolverProvider for AnthropicSolver {
    fn is_configured(&self) -> bool {
        has_env_key(API_KEY_ENV)
    }

    async fn extract_problem(
        &self,
        shots: &[ShotPayload],
        language: &str,
    ) -> Result<ProblemInfo, ProviderError> {
        log::info!("[LLM] EXTRACT: {} screenshot(s), language={}", shots.len(), language);
        let content = message_with_images(
            &prompts::build_extract_message(language, shots.len()),
            shots,
        );
        let text = self.call(EXTRACT_SYSTEM_PROMPT, EXTRACT_MAX_TOKENS, content).await?;
        parse_json_response(&text)
    }

    async fn generate_solutions(
        &self,
        problem: &ProblemInfo,
    ) -> Result<Solution, ProviderError> {
        let problem_json = serde_json::to_string(problem)
            .map_err(|e| ProviderError::remote(format!("Could not encode problem: {}", e)))?;
        let language = problem.language.as_deref().unwrap_or("Python");
        log::info!(
            "[LLM] SOLVE: problem statement {} chars, language={}",
            problem.problem_statement.len(),
            language
        );
        let content = serde_json::json!([{
            "type": "text",
            "text": prompts::build_solve_message(&problem_json, language),
        }]);
        let text = self.call(SOLVE_SYSTEM_PROMPT, SOLVE_MAX_TOKENS, content).await?;
        parse_json_response(&text)
    }

    async fn debug(
        &self,
        problem: &ProblemInfo,
        shots: &[ShotPayload],
    ) -> Result<DebugReport, ProviderError> {
        let problem_json = serde_json::to_string(problem)
            .map_err(|e| ProviderError::remote(format!("Could not encode problem: {}", e)))?;
        log::info!("[LLM] DEBUG: {} screenshot(s)", shots.len());
        let content = message_with_images(
            &prompts::build_debug_message(&problem_json, shots.len()),
            shots,
        );
        let text = self.call(DEBUG_SYSTEM_PROMPT, DEBUG_MAX_TOKENS, content).await?;
        parse_json_response(&text)
    }
}

/// Build a user-message content array: the instruction text followed by
/// one base64 image block per screenshot.
fn message_with_images(text: &str, shots: &[ShotPayload]) -> serde_json::Value {
    let mut blocks = vec![serde_json::json!({"type": "text", "text": text})];
    for shot in shots {
        blocks.push(serde_json::json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": "image/png",
                "data": base64::engine::general_purpose::STANDARD.encode(&shot.data),
            }
        }));
    }
    serde_json::Value::Array(blocks)
}

/// Strip fences and parse the model's JSON answer into a wire type.
fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, ProviderError> {
    let json_text = prompts::strip_code_fences(text);
    serde_json::from_str(json_text).map_err(|e| {
        log::error!(
            "[LLM] JSON parse failed: {} — raw: {}",
            e,
            &json_text[..200.min(json_text.len())]
        );
        ProviderError::remote(format!("Failed to parse LLM response: {}", e))
    })
}

/// Extract the text content from an Anthropic Messages API response.
fn extract_anthropic_text(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    let content = parsed.get("content")?.as_array()?;
    for block in content {
        if block.get("type")?.as_str()? == "text" {
            return block.get("text")?.as_str().map(|s| s.to_string());
        }
    }
    None
}

/// Pull `error.message` out of an API error body, if present.
fn extract_api_error(body: &str) -> Option<String> {
    let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}
