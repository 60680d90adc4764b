//! Gateway provider implementations

mod gemini;
pub mod mock;

pub use gemini::{GEMINI_API_URL, GeminiProvider};
pub use mock::MockProvider;
