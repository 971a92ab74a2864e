//! Run error taxonomy.
//!
//! Classes 1–3 abort the run; persistence failures never appear here —
//! they are absorbed as warnings. User-facing text comes exclusively
//! from [`AnalysisError::user_message`]; the `Display` impls carry
//! operator diagnostics and must stay out of caller responses.

use thiserror::Error;

use crate::provider::ProviderError;
use crate::report::{ValidationError, VALIDATION_USER_MESSAGE};
use crate::views::View;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Overload, rate limiting or timeout, after the retry ceiling.
    #[error("model provider failed transiently: {0}")]
    TransientProvider(#[source] ProviderError),

    /// Any other provider failure — no retry was attempted.
    #[error("model provider failed: {0}")]
    FatalProvider(#[source] ProviderError),

    /// The response failed to parse or violated the report contract.
    #[error("analysis result rejected: {0}")]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    /// Wraps a provider failure according to its retryability class.
    pub fn from_provider(error: ProviderError) -> Self {
        if error.is_retryable() {
            AnalysisError::TransientProvider(error)
        } else {
            AnalysisError::FatalProvider(error)
        }
    }

    /// The human-readable message returned to the caller. Deliberately
    /// coarse: validation diagnostics never leak past the logs.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::TransientProvider(ProviderError::Status { status: 503, .. }) => {
                "Service temporarily unavailable (503). Retried 3 times. Please try again later."
                    .to_string()
            }
            AnalysisError::TransientProvider(ProviderError::Status { status: 429, .. }) => {
                "Too many requests (429). Please wait a moment and try again.".to_string()
            }
            AnalysisError::TransientProvider(_) => {
                "The analysis service did not respond in time. Please try again later.".to_string()
            }
            AnalysisError::FatalProvider(_) => {
                "Analysis failed. Please check API key and try again.".to_string()
            }
            AnalysisError::Validation(_) => VALIDATION_USER_MESSAGE.to_string(),
        }
    }
}

/// Non-fatal events recorded on the run.
#[derive(Debug, Clone)]
pub enum RunWarning {
    BlobWriteFailed { view: View, error: String },
    RecordWriteFailed { error: String },
}
