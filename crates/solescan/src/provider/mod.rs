//! The generative model seam.
//!
//! The pipeline talks to `dyn ModelProvider`; the one production
//! implementation is the Gemini REST client. Failures carry their own
//! retryability classification so the invoker's policy stays mechanical.

pub mod gemini;

use async_trait::async_trait;
use thiserror::Error;

pub use gemini::GeminiClient;

/// Status codes treated as transient. Taken from the observed provider
/// behavior; a configuration point, not an architectural constant.
pub const RETRYABLE_STATUS: [u16; 2] = [503, 429];

/// Maximum length for provider error bodies kept in logs and messages.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a provider error body to keep logs readable.
fn sanitize_error_body(body: &str) -> String {
    if body.len() > MAX_ERROR_BODY_LENGTH {
        let mut cut = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated)", &body[..cut])
    } else {
        body.to_string()
    }
}

/// One inline image for model transport.
#[derive(Debug, Clone)]
pub struct ImagePart {
    pub media_type: String,
    pub data_base64: String,
}

/// A fully assembled inference request: system instructions, the
/// view-presence context block, then image parts in canonical order.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub system_instruction: String,
    pub context_block: String,
    pub image_parts: Vec<ImagePart>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The endpoint answered with a non-success status.
    #[error("model endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never completed (connect, TLS, timeout, body).
    #[error("request to model endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A 2xx response with no candidate text to hand to the validator.
    #[error("model response carried no candidate text")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether a retry is expected to help. Overload and rate-limit
    /// statuses are transient, as are plain timeouts; everything else
    /// fails the run immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => RETRYABLE_STATUS.contains(status),
            ProviderError::Transport(e) => e.is_timeout(),
            ProviderError::EmptyResponse => false,
        }
    }
}

/// A long-lived, concurrency-safe handle to the generative model.
/// One logical call per attempt; the retry policy lives in the invoker.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Performs one inference attempt and returns the raw response text.
    async fn generate(&self, request: &InferenceRequest) -> Result<String, ProviderError>;

    /// Identifier recorded in the persistence audit block.
    fn model_version(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let unavailable = ProviderError::Status {
            status: 503,
            message: "overloaded".into(),
        };
        let rate_limited = ProviderError::Status {
            status: 429,
            message: "slow down".into(),
        };
        let unauthorized = ProviderError::Status {
            status: 401,
            message: "bad key".into(),
        };

        assert!(unavailable.is_retryable());
        assert!(rate_limited.is_retryable());
        assert!(!unauthorized.is_retryable());
        assert!(!ProviderError::EmptyResponse.is_retryable());
    }

    #[test]
    fn test_sanitize_error_body_truncates() {
        let long = "x".repeat(500);
        let sanitized = sanitize_error_body(&long);
        assert!(sanitized.ends_with("(truncated)"));
        assert!(sanitized.len() < long.len());

        assert_eq!(sanitize_error_body("short"), "short");
    }
}
