use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Rate limit exceeded (HTTP 429){}", .retry_after.map(|s| format!(". Retry after {} seconds", s)).unwrap_or_default())]
    RateLimited { retry_after: Option<u64> },

    #[error("API error{}: {message}", status_code.map(|c| format!(" (HTTP {})", c)).unwrap_or_default())]
    ApiError {
        message: String,
        status_code: Option<u16>,
    },

    #[error("API returned an empty response")]
    EmptyResponse,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl LlmError {
    /// HTTP status carried by the error, if the gateway answered at all
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::ApiError { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, LlmError>;
