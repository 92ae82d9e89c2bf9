//! Model interaction: send the assembled prompt, get the report back.
//!
//! All LLM traffic goes through the [`ReportModel`] trait so tests and
//! embedding applications can swap in their own backend via
//! [`crate::config::AnalysisConfigBuilder::provider`]. The default backend
//! is [`GeminiClient`], a thin typed wrapper over the Gemini
//! `generateContent` REST endpoint.
//!
//! ## Retry Strategy
//!
//! HTTP 429 / 5xx answers and transport hiccups are transient. Exponential
//! backoff (`retry_backoff_ms * 2^attempt`) avoids hammering a recovering
//! endpoint: with the 500 ms default and 3 retries the wait sequence is
//! 500 ms → 1 s → 2 s. Permanent errors (bad key, 400) are not retried and
//! surface immediately.

use crate::config::AnalysisConfig;
use crate::error::ScanAoError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{sleep, Duration};
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Errors from a single model call (before retry).
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model returned empty content")]
    EmptyContent,
}

impl LlmError {
    /// Whether a retry has any chance of helping.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Http(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Parse(_) | LlmError::EmptyContent => false,
        }
    }
}

/// A model response: the report text plus token accounting.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub text: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// The LLM collaborator: one prompt in, one free-text report out.
///
/// Implementations must be `Send + Sync`; the pipeline holds them behind an
/// `Arc` and never calls them concurrently for a single request.
#[async_trait]
pub trait ReportModel: Send + Sync {
    /// Generate the analysis report for an assembled prompt.
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, LlmError>;

    /// Backend label for logs and stats.
    fn name(&self) -> &str {
        "custom"
    }
}

// ── Gemini REST client ───────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata", default)]
    usage: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageMetadata {
    #[serde(rename = "promptTokenCount", default)]
    prompt_tokens: u64,
    #[serde(rename = "candidatesTokenCount", default)]
    candidate_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Gemini `generateContent` client — the default [`ReportModel`].
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    temperature: f32,
    max_output_tokens: usize,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: String,
        temperature: f32,
        max_output_tokens: usize,
        timeout_secs: u64,
    ) -> Result<Self, ScanAoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ScanAoError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key,
            model,
            temperature,
            max_output_tokens,
        })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_BASE}/{}:generateContent", self.model)
    }
}

#[async_trait]
impl ReportModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, LlmError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(LlmError::EmptyContent);
        }

        let (input_tokens, output_tokens) = parsed
            .usage
            .map(|u| (u.prompt_tokens, u.candidate_tokens))
            .unwrap_or((0, 0));

        debug!(
            "Model call succeeded: {} input tokens, {} output tokens",
            input_tokens, output_tokens
        );

        Ok(ModelResponse {
            text,
            input_tokens,
            output_tokens,
        })
    }

    fn name(&self) -> &str {
        &self.model
    }
}

// ── Retry driver ─────────────────────────────────────────────────────────

/// Call the model with the configured retry/backoff policy.
///
/// Transient failures are retried up to `config.max_retries` times; anything
/// else — and retry exhaustion — becomes [`ScanAoError::ModelFailed`].
pub async fn generate_report(
    model: &Arc<dyn ReportModel>,
    prompt: &str,
    config: &AnalysisConfig,
) -> Result<ModelResponse, ScanAoError> {
    let mut last_err: Option<LlmError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let backoff = config.retry_backoff_ms * 2u64.pow(attempt - 1);
            warn!(
                "Model call: retry {}/{} after {}ms",
                attempt, config.max_retries, backoff
            );
            sleep(Duration::from_millis(backoff)).await;
        }

        match model.generate(prompt).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_transient() => {
                warn!("Model call attempt {} failed — {}", attempt + 1, e);
                last_err = Some(e);
            }
            Err(e) => {
                return Err(ScanAoError::ModelFailed {
                    retries: attempt + 1,
                    source: e,
                });
            }
        }
    }

    Err(ScanAoError::ModelFailed {
        retries: config.max_retries + 1,
        source: last_err.unwrap_or(LlmError::EmptyContent),
    })
}
