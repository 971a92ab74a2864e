//! System instructions and the view-presence context block.

use crate::views::View;

/// The forensic analyst instruction document, shipped with the crate.
pub const SYSTEM_PROMPT: &str = include_str!("../../prompts/analysis.md");

/// Builds the short context block that tells the model exactly which
/// views it received, so it can calibrate confidence and limitations.
pub fn context_block(present: &[View], missing: &[View]) -> String {
    format!(
        "Context Injection:\nViews present: {}\nMissing views: {}",
        join_labels(present),
        join_labels(missing)
    )
}

fn join_labels(views: &[View]) -> String {
    views
        .iter()
        .map(|v| v.label())
        .collect::<Vec<_>>()
        .join(", ")
}
