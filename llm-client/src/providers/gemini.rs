//! Gemini API provider
//!
//! Direct HTTP implementation of the `generateContent` endpoint. Each
//! provider owns its credential, so two runs never share key state.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
use crate::secret::ApiKey;

pub const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Provider for the hosted Gemini models
pub struct GeminiProvider {
    model: String,
    base_url: String,
    api_key: ApiKey,
    client: Client,
}

impl GeminiProvider {
    /// Create a provider for a bare model identifier such as `gemini-1.5-flash`
    pub fn new(model: &str, api_key: ApiKey) -> Result<Self> {
        Self::with_base_url(model, GEMINI_API_URL, api_key)
    }

    /// Create a provider against a custom endpoint
    pub fn with_base_url(model: &str, base_url: &str, api_key: ApiKey) -> Result<Self> {
        if model.trim().is_empty() {
            return Err(LlmError::ConfigError("model identifier is empty".into()));
        }

        let client = Client::builder().build().map_err(|e| {
            LlmError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        Ok(Self {
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

// Gemini API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

fn build_request(request: &LlmRequest) -> GenerateContentRequest<'_> {
    let generation_config = if request.max_tokens.is_some() || request.temperature.is_some() {
        Some(GenerationConfig {
            max_output_tokens: request.max_tokens,
            temperature: request.temperature,
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user"),
            parts: vec![Part {
                text: &request.prompt,
            }],
        }],
        system_instruction: request.system_prompt.as_deref().map(|text| Content {
            role: None,
            parts: vec![Part { text }],
        }),
        generation_config,
    }
}

/// Map a non-success status and its body to a typed error
fn error_from_status(status: u16, body: &str) -> LlmError {
    let parsed = serde_json::from_str::<ErrorResponse>(body).ok();

    if status == 429 {
        let retry_after = parsed
            .as_ref()
            .and_then(|r| r.error.details.iter().find_map(retry_delay_secs));
        return LlmError::RateLimited { retry_after };
    }

    let message = match parsed {
        Some(error_response) => error_response.error.message,
        None => body.to_string(),
    };

    LlmError::ApiError {
        message,
        status_code: Some(status),
    }
}

/// Render an error with every cause in its source chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !rendered.contains(&text) {
            rendered.push_str(": ");
            rendered.push_str(&text);
        }
        source = cause.source();
    }
    rendered
}

/// Read `retryDelay` ("30s" or a bare number) from a `RetryInfo` detail
fn retry_delay_secs(detail: &serde_json::Value) -> Option<u64> {
    let delay = detail.get("retryDelay")?;
    if let Some(secs) = delay.as_u64() {
        return Some(secs);
    }
    let secs: f64 = delay.as_str()?.trim_end_matches('s').parse().ok()?;
    Some(secs.ceil() as u64)
}

/// Concatenate the text parts of the first candidate that has any
fn extract_text(response: &GenerateContentResponse) -> Result<String> {
    for candidate in &response.candidates {
        match candidate.finish_reason.as_deref() {
            Some("MAX_TOKENS") => warn!("Gemini response truncated at the token limit"),
            Some("SAFETY") => warn!("Gemini response blocked by safety filters"),
            Some("RECITATION") => warn!("Gemini response blocked due to recitation"),
            _ => {}
        }

        let Some(content) = &candidate.content else {
            continue;
        };
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if !text.trim().is_empty() {
            return Ok(text);
        }
    }

    Err(LlmError::EmptyResponse)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let body = build_request(&request);
        debug!("POST {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiError {
                message: format!("Request failed: {}", error_chain(&e.without_url())),
                status_code: None,
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_else(|e| {
                warn!("Failed to read error body for HTTP {}: {}", status, e.without_url());
                String::new()
            });
            return Err(error_from_status(status.as_u16(), &error_text));
        }

        let api_response: GenerateContentResponse =
            response.json().await.map_err(|e| LlmError::ApiError {
                message: format!("Failed to parse response: {}", error_chain(&e.without_url())),
                status_code: None,
            })?;

        let content = extract_text(&api_response)?;
        let usage = api_response.usage_metadata.map(|u| TokenUsage {
            input_tokens: u.prompt_token_count,
            output_tokens: u.candidates_token_count,
        });

        Ok(LlmResponse {
            content,
            model: self.model.clone(),
            usage,
        })
    }

    fn name(&self) -> &'static str {
        "Gemini API"
    }
}
