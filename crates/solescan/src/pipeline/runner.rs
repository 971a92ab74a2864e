//! Pipeline controller.
//!
//! Sequences collect → blob fan-out → invoke (retry inside) → validate →
//! record write, owns the run identifier, and produces exactly one of a
//! report or a classified error. Persistence is best-effort on both
//! sinks and can never change the run outcome.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{info, info_span, warn, Instrument};

use crate::db::{PersistenceRecord, RecordSink};
use crate::provider::ModelProvider;
use crate::report::{parse_report, ForensicReport};
use crate::storage::BlobSink;
use crate::views::{collect_views, CollectedViews, View, ViewImage};

use super::context::{RunContext, RunState};
use super::error::{AnalysisError, RunWarning};
use super::invoker;

/// Terminal outcome of one run: the stable run identifier plus exactly
/// one of a validated report or a classified error.
#[derive(Debug)]
pub struct RunOutcome {
    pub run_id: String,
    pub report: Option<ForensicReport>,
    pub error: Option<AnalysisError>,
    pub warnings: Vec<RunWarning>,
}

impl RunOutcome {
    fn success(ctx: RunContext) -> Self {
        Self {
            run_id: ctx.run_id,
            report: ctx.report,
            error: None,
            warnings: ctx.warnings,
        }
    }

    fn failure(ctx: RunContext, error: AnalysisError) -> Self {
        Self {
            run_id: ctx.run_id,
            report: None,
            error: Some(error),
            warnings: ctx.warnings,
        }
    }

    pub fn is_success(&self) -> bool {
        self.report.is_some()
    }

    /// Human-readable classified message for the caller, present iff
    /// the run failed.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.user_message())
    }
}

/// The analysis pipeline. Holds only long-lived, concurrency-safe
/// client handles; every run is fully isolated in its own context.
pub struct Pipeline {
    provider: Arc<dyn ModelProvider>,
    blob_sink: Option<Arc<dyn BlobSink>>,
    record_sink: Option<Arc<dyn RecordSink>>,
}

impl Pipeline {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        blob_sink: Option<Arc<dyn BlobSink>>,
        record_sink: Option<Arc<dyn RecordSink>>,
    ) -> Self {
        Self {
            provider,
            blob_sink,
            record_sink,
        }
    }

    /// Runs the full pipeline for one submission.
    pub async fn run(&self, uploads: HashMap<View, ViewImage>) -> RunOutcome {
        let ctx = RunContext::new();
        let span = info_span!("analysis_run", run_id = %ctx.run_id);
        self.run_inner(ctx, uploads).instrument(span).await
    }

    async fn run_inner(
        &self,
        mut ctx: RunContext,
        uploads: HashMap<View, ViewImage>,
    ) -> RunOutcome {
        // Step 1: collect. Cannot fail — an empty submission is still a
        // run, left to the model to qualify via the context block.
        ctx.state = RunState::Collecting;
        let collected = collect_views(uploads);
        ctx.present_views = collected.present_views();
        ctx.missing_views = collected.missing.clone();
        info!(
            "collected {} present view(s), {} missing",
            ctx.present_views.len(),
            ctx.missing_views.len()
        );

        // Step 2: blob fan-out. Each present view is written as soon as
        // its bytes are available, independent of the model outcome.
        self.step_store_blobs(&mut ctx, &collected).await;

        // Step 3: invoke with retry.
        ctx.state = RunState::Invoking { attempt: 1 };
        let request = invoker::build_request(&collected);
        let (attempts, result) =
            invoker::invoke_with_retry(self.provider.as_ref(), &request).await;
        ctx.attempts = attempts;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                ctx.state = RunState::Failed;
                return RunOutcome::failure(ctx, e);
            }
        };
        // Step 4: validate. The raw text is accepted whole or the run
        // fails; no partially-valid report exists.
        ctx.state = RunState::Validating;
        let report = match parse_report(&raw) {
            Ok(report) => report,
            Err(e) => {
                ctx.state = RunState::Failed;
                return RunOutcome::failure(ctx, AnalysisError::Validation(e));
            }
        };
        ctx.raw_response = Some(raw);

        // Step 5: record write, only after validation, best effort.
        ctx.state = RunState::Persisting;
        self.step_persist_record(&mut ctx, &report).await;

        ctx.state = RunState::Done;
        ctx.report = Some(report);
        RunOutcome::success(ctx)
    }

    /// Dispatches the per-view blob writes as a concurrent fan-out —
    /// up to five independent operations, each on a distinct path. A
    /// failed write is logged and skipped; the rest proceed.
    async fn step_store_blobs(&self, ctx: &mut RunContext, collected: &CollectedViews) {
        let Some(sink) = &self.blob_sink else {
            return;
        };

        let writes = collected.present.iter().map(|(view, image)| {
            let sink = Arc::clone(sink);
            let run_id = ctx.run_id.clone();
            let view = *view;
            async move { (view, sink.put_view(&run_id, view, image).await) }
        });

        for (view, result) in join_all(writes).await {
            match result {
                Ok(blob) => ctx.blob_refs.push(blob),
                Err(e) => {
                    warn!("blob write for view {} failed: {}", view, e);
                    ctx.warnings.push(RunWarning::BlobWriteFailed {
                        view,
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    /// Writes the terminal snapshot. A failure is logged and swallowed —
    /// the caller's report is already in hand.
    async fn step_persist_record(&self, ctx: &mut RunContext, report: &ForensicReport) {
        let Some(sink) = &self.record_sink else {
            return;
        };

        let record = PersistenceRecord::new(
            &ctx.run_id,
            report.clone(),
            ctx.blob_refs.clone(),
            ctx.present_views.clone(),
            ctx.missing_views.clone(),
            self.provider.model_version(),
        );

        if let Err(e) = sink.put_record(&record).await {
            warn!("record write for run {} failed: {}", ctx.run_id, e);
            ctx.warnings.push(RunWarning::RecordWriteFailed {
                error: e.to_string(),
            });
        }
    }
}
