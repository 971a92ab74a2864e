//! Model invocation with bounded retry.
//!
//! One logical inference call per run, up to three attempts. Only
//! transient failures are retried, with a deterministic exponential
//! delay and no jitter; any other failure is fatal immediately.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use log::{debug, warn};

use crate::provider::{ImagePart, InferenceRequest, ModelProvider};
use crate::views::CollectedViews;

use super::error::AnalysisError;
use super::prompt;

/// Total attempt ceiling, including the first call.
pub const MAX_ATTEMPTS: u32 = 3;

/// Delay slept after failed attempt `n` before the next one:
/// `1000 * 2^(n-1)` ms — 1 s after the first failure, 2 s after the
/// second. A pure function of the attempt index.
pub(crate) fn backoff_delay(failed_attempt: u32) -> Duration {
    Duration::from_millis(1000 * 2u64.pow(failed_attempt - 1))
}

/// Assembles the inference request: system instructions, the
/// view-presence context block, then the present images in canonical
/// order, base64-encoded for inline transport.
pub fn build_request(collected: &CollectedViews) -> InferenceRequest {
    let image_parts = collected
        .present
        .iter()
        .map(|(_, image)| ImagePart {
            media_type: image.media_type.clone(),
            data_base64: BASE64.encode(&image.bytes),
        })
        .collect();

    InferenceRequest {
        system_instruction: prompt::SYSTEM_PROMPT.to_string(),
        context_block: prompt::context_block(&collected.present_views(), &collected.missing),
        image_parts,
    }
}

/// Runs the retry loop. Returns the number of attempts made together
/// with the final result; the raw response text is yielded exactly once.
pub async fn invoke_with_retry(
    provider: &dyn ModelProvider,
    request: &InferenceRequest,
) -> (u32, Result<String, AnalysisError>) {
    let mut attempt = 0;

    loop {
        attempt += 1;
        match provider.generate(request).await {
            Ok(raw) => return (attempt, Ok(raw)),
            Err(e) => {
                warn!("model call attempt {} failed: {}", attempt, e);

                if e.is_retryable() && attempt < MAX_ATTEMPTS {
                    let delay = backoff_delay(attempt);
                    debug!("retrying in {}ms", delay.as_millis());
                    tokio::time::sleep(delay).await;
                    continue;
                }

                return (attempt, Err(AnalysisError::from_provider(e)));
            }
        }
    }
}
