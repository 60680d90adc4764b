//! Gateway client for the suneung problem generator
//!
//! Provides a single-shot text generation interface over the Gemini
//! `generateContent` API, a scripted mock for tests, and the shared
//! configuration file.

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;
pub mod secret;

pub use config::{Config, GatewayConfig};
pub use error::{LlmError, Result};
pub use provider::{LlmProvider, LlmRequest, LlmResponse, TokenUsage};
pub use providers::{GeminiProvider, MockProvider};
pub use secret::ApiKey;
