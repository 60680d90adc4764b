//! Scripted LLM provider for testing
//!
//! Answers calls from a queue of canned results so tests can decide exactly
//! which iteration succeeds and which one fails.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use crate::error::{LlmError, Result};
use crate::provider::{LlmProvider, LlmRequest, LlmResponse};

/// A mock provider that replays a script of responses
pub struct MockProvider {
    /// Results handed out in order, one per call
    script: Mutex<VecDeque<Result<String>>>,
    /// Returned once the script runs dry
    fallback: String,
    /// Prompts seen so far
    prompts: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockProvider {
    /// Replay `responses` in order, then answer with an empty string
    pub fn scripted(responses: Vec<Result<String>>) -> Self {
        Self {
            script: Mutex::new(responses.into()),
            fallback: String::new(),
            prompts: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Create a provider that always succeeds
    pub fn always_succeeds(response: &str) -> Self {
        Self::scripted(Vec::new()).with_fallback(response)
    }

    /// Succeed with `response` until call `n` (1-based), which fails with `error`
    pub fn fails_on(n: usize, error: LlmError, response: &str) -> Self {
        let mut script: Vec<Result<String>> = (1..n).map(|_| Ok(response.to_string())).collect();
        script.push(Err(error));
        Self::scripted(script).with_fallback(response)
    }

    /// Set the answer used after the script is exhausted
    pub fn with_fallback(mut self, response: &str) -> Self {
        self.fallback = response.to_string();
        self
    }

    /// Get the number of times complete() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order
    pub fn prompts(&self) -> Vec<String> {
        lock(&self.prompts).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.prompts).push(request.prompt);

        let next = lock(&self.script).pop_front();
        let content = match next {
            Some(result) => result?,
            None => self.fallback.clone(),
        };

        Ok(LlmResponse {
            content,
            model: "mock-model".to_string(),
            usage: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_always_succeeds() {
        let provider = MockProvider::always_succeeds("success");

        for _ in 0..3 {
            let result = provider.complete(LlmRequest::from_prompt("test")).await;
            assert_eq!(result.unwrap().content, "success");
        }
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_order() {
        let provider = MockProvider::scripted(vec![
            Ok("A".to_string()),
            Err(LlmError::EmptyResponse),
            Ok("C".to_string()),
        ]);

        let first = provider.complete(LlmRequest::from_prompt("1")).await;
        let second = provider.complete(LlmRequest::from_prompt("2")).await;
        let third = provider.complete(LlmRequest::from_prompt("3")).await;
        let fourth = provider.complete(LlmRequest::from_prompt("4")).await;

        assert_eq!(first.unwrap().content, "A");
        assert!(matches!(second, Err(LlmError::EmptyResponse)));
        assert_eq!(third.unwrap().content, "C");
        assert_eq!(fourth.unwrap().content, "");
        assert_eq!(provider.prompts(), vec!["1", "2", "3", "4"]);
    }

    #[tokio::test]
    async fn test_fails_on() {
        let provider = MockProvider::fails_on(
            2,
            LlmError::RateLimited { retry_after: None },
            "ok",
        );

        assert!(provider.complete(LlmRequest::from_prompt("p")).await.is_ok());
        assert!(matches!(
            provider.complete(LlmRequest::from_prompt("p")).await,
            Err(LlmError::RateLimited { .. })
        ));
        assert_eq!(
            provider.complete(LlmRequest::from_prompt("p")).await.unwrap().content,
            "ok"
        );
        assert_eq!(provider.call_count(), 3);
    }
}
