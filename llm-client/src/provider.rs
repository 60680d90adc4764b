use async_trait::async_trait;

use crate::error::Result;

/// A single-shot, text-only generation request
#[derive(Debug, Clone, Default)]
pub struct LlmRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl LlmRequest {
    /// Request carrying only a user prompt
    pub fn from_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }
}

/// Text returned by the gateway
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// A model handle bound to one credential
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request one completion. No streaming, no retries.
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    /// Provider name for display
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<P: LlmProvider + ?Sized> LlmProvider for std::sync::Arc<P> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        (**self).complete(request).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
