//! Per-run state.

use uuid::Uuid;

use crate::report::ForensicReport;
use crate::storage::BlobRef;
use crate::views::View;

use super::error::RunWarning;

/// Controller state machine. COLLECTING and PERSISTING cannot fail the
/// run; INVOKING and VALIDATING can.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Collecting,
    Invoking { attempt: u32 },
    Validating,
    Persisting,
    Done,
    Failed,
}

/// Ephemeral state of one analysis run. Created at request start, lives
/// for one invocation; only its terminal snapshot is ever persisted.
pub struct RunContext {
    /// Minted once at entry, stable for the rest of the run.
    pub run_id: String,
    pub state: RunState,

    // Set after collection
    pub present_views: Vec<View>,
    pub missing_views: Vec<View>,

    // Blob fan-out results — successes only
    pub blob_refs: Vec<BlobRef>,

    // Set after invocation
    pub attempts: u32,
    pub raw_response: Option<String>,

    // Set after validation
    pub report: Option<ForensicReport>,

    // Non-fatal warnings (persistence failures)
    pub warnings: Vec<RunWarning>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            state: RunState::Collecting,
            present_views: Vec::new(),
            missing_views: Vec::new(),
            blob_refs: Vec::new(),
            attempts: 0,
            raw_response: None,
            report: None,
            warnings: Vec::new(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
