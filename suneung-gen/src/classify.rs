//! Turns gateway failures into operator-facing diagnostics

use llm_client::LlmError;
use std::fmt;

use crate::credential::MissingCredential;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No override and no configured default. Raised before any remote call.
    MissingCredential,
    ModelNotFound,
    QuotaExceeded,
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MissingCredential => "missing credential",
            Self::ModelNotFound => "model not found",
            Self::QuotaExceeded => "quota exceeded",
            Self::Other => "error",
        })
    }
}

/// A classified failure with the message shown to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub message: String,
}

impl Diagnostic {
    pub fn missing_credential(err: &MissingCredential) -> Self {
        Self {
            kind: ErrorKind::MissingCredential,
            message: err.to_string(),
        }
    }
}

/// Classify a gateway error, preferring its status code over its text
pub fn classify(err: &LlmError) -> Diagnostic {
    let raw = err.to_string();
    let kind = match err.status_code() {
        Some(404) => ErrorKind::ModelNotFound,
        Some(429) => ErrorKind::QuotaExceeded,
        _ => kind_from_message(&raw),
    };

    let message = match kind {
        ErrorKind::ModelNotFound => format!(
            "Model not found (404). Remove any path prefix such as `models/` and pass the bare model name, e.g. gemini-1.5-flash. Gateway said: {raw}"
        ),
        ErrorKind::QuotaExceeded => {
            let mut message = "Quota exceeded (429). Enter an API key from a different account and start again."
                .to_string();
            if let LlmError::RateLimited {
                retry_after: Some(secs),
            } = err
            {
                message.push_str(&format!(
                    " The gateway suggests retrying in {} seconds.",
                    secs
                ));
            }
            message
        }
        ErrorKind::MissingCredential | ErrorKind::Other => raw,
    };

    Diagnostic { kind, message }
}

/// Status digits are the only signal in an unstructured error text
fn kind_from_message(message: &str) -> ErrorKind {
    if message.contains("404") {
        ErrorKind::ModelNotFound
    } else if message.contains("429") {
        ErrorKind::QuotaExceeded
    } else {
        ErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untyped(message: &str) -> LlmError {
        LlmError::ApiError {
            message: message.to_string(),
            status_code: None,
        }
    }

    #[test]
    fn test_typed_not_found() {
        let diag = classify(&LlmError::ApiError {
            message: "models/foo is not found for API version v1beta".to_string(),
            status_code: Some(404),
        });
        assert_eq!(diag.kind, ErrorKind::ModelNotFound);
        assert!(diag.message.contains("models/"));
        assert!(diag.message.contains("bare model name"));
    }

    #[test]
    fn test_typed_rate_limit() {
        let diag = classify(&LlmError::RateLimited {
            retry_after: Some(10),
        });
        assert_eq!(diag.kind, ErrorKind::QuotaExceeded);
        assert!(diag.message.contains("different account"));
    }

    #[test]
    fn test_rate_limit_carries_retry_hint() {
        let diag = classify(&LlmError::RateLimited {
            retry_after: Some(28),
        });
        assert!(diag.message.contains("retrying in 28 seconds"));

        let diag = classify(&LlmError::RateLimited { retry_after: None });
        assert!(!diag.message.contains("retrying in"));
    }

    #[test]
    fn test_substring_fallback() {
        assert_eq!(
            classify(&untyped("HTTP 404 model not found")).kind,
            ErrorKind::ModelNotFound
        );
        assert_eq!(
            classify(&untyped("429 Too Many Requests")).kind,
            ErrorKind::QuotaExceeded
        );
    }

    #[test]
    fn test_404_checked_before_429() {
        assert_eq!(
            classify(&untyped("404 after 429")).kind,
            ErrorKind::ModelNotFound
        );
    }

    #[test]
    fn test_unknown_status_falls_back_to_text() {
        let diag = classify(&LlmError::ApiError {
            message: "request 4291 failed".to_string(),
            status_code: Some(500),
        });
        assert_eq!(diag.kind, ErrorKind::QuotaExceeded);

        let diag = classify(&LlmError::ApiError {
            message: "backend unavailable".to_string(),
            status_code: Some(503),
        });
        assert_eq!(diag.kind, ErrorKind::Other);
    }

    #[test]
    fn test_other_keeps_original_text() {
        let diag = classify(&untyped("connection reset"));
        assert_eq!(diag.kind, ErrorKind::Other);
        assert_eq!(diag.message, "API error: connection reset");

        let diag = classify(&LlmError::EmptyResponse);
        assert_eq!(diag.kind, ErrorKind::Other);
        assert_eq!(diag.message, LlmError::EmptyResponse.to_string());
    }

    #[test]
    fn test_missing_credential_diagnostic() {
        let diag = Diagnostic::missing_credential(&MissingCredential);
        assert_eq!(diag.kind, ErrorKind::MissingCredential);
        assert!(diag.message.contains("GEMINI_API_KEY"));
    }
}
