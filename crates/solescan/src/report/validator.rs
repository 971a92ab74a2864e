//! Parses and enforces the report contract.
//!
//! Two independent failure points: the raw text is not the expected JSON
//! document, or it parses but violates a field constraint. Both are
//! reported to callers as the same generic message; the specific
//! diagnostic stays operator-side (log output) only. Out-of-range values
//! are rejected, never clamped.

use log::error;
use thiserror::Error;

use crate::views::View;

use super::schema::ForensicReport;

/// The only validation text callers may surface to end users.
pub const VALIDATION_USER_MESSAGE: &str = "Analysis result validation failed.";

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("response is not a valid report document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("field '{field}' out of range: {value} (expected 0-100)")]
    OutOfRange { field: &'static str, value: f32 },

    #[error("view {view} listed as both received and missing")]
    ViewOverlap { view: View },

    #[error("view {view} absent from both received and missing lists")]
    ViewUnaccounted { view: View },

    #[error("view {view} listed more than once")]
    ViewDuplicated { view: View },
}

/// Parses the model's raw text into a validated [`ForensicReport`].
///
/// The specific failure is logged for operators and returned for callers
/// to classify; it must not be forwarded verbatim to end users.
pub fn parse_report(raw: &str) -> Result<ForensicReport, ValidationError> {
    let report: ForensicReport = serde_json::from_str(raw).map_err(|e| {
        error!("report failed to parse: {}", e);
        ValidationError::Parse(e)
    })?;

    if let Err(e) = validate(&report) {
        error!("report violates contract: {}", e);
        return Err(e);
    }

    Ok(report)
}

/// Checks the constraints typed deserialization cannot express: bounded
/// numeric ranges and the received/missing view partition.
fn validate(report: &ForensicReport) -> Result<(), ValidationError> {
    check_range(
        "shoe_info.confidence_score",
        report.shoe_info.confidence_score,
    )?;
    check_range(
        "component_health.outsole.condition_score",
        report.component_health.outsole.condition_score,
    )?;
    check_range(
        "component_health.midsole.life_remaining_percentage",
        report.component_health.midsole.life_remaining_percentage,
    )?;

    check_partition(
        &report.analysis_audit.received_views,
        &report.analysis_audit.missing_views,
    )
}

fn check_range(field: &'static str, value: f32) -> Result<(), ValidationError> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(ValidationError::OutOfRange { field, value });
    }
    Ok(())
}

/// `received` and `missing` must partition the five canonical views:
/// every view in exactly one list, no duplicates.
fn check_partition(received: &[View], missing: &[View]) -> Result<(), ValidationError> {
    for view in View::ALL {
        let in_received = received.iter().filter(|v| **v == view).count();
        let in_missing = missing.iter().filter(|v| **v == view).count();

        if in_received > 1 || in_missing > 1 {
            return Err(ValidationError::ViewDuplicated { view });
        }
        match (in_received, in_missing) {
            (1, 1) => return Err(ValidationError::ViewOverlap { view }),
            (0, 0) => return Err(ValidationError::ViewUnaccounted { view }),
            _ => {}
        }
    }
    Ok(())
}
