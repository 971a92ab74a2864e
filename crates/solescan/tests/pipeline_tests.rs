//! End-to-end pipeline tests against a scripted provider and real
//! (temporary) sinks.

mod common;

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use solescan::db::{run_repo, Database, RecordSink, SqliteRecordStore};
use solescan::pipeline::{AnalysisError, Pipeline};
use solescan::storage::{BlobSink, FsBlobStore};
use solescan::views::View;

use common::{
    fatal_401, report_json, transient_429, transient_503, uploads, FlakyBlobSink,
    ScriptedProvider,
};

fn pipeline_with(
    provider: ScriptedProvider,
    blob_root: Option<&TempDir>,
    db: Option<&Database>,
) -> Pipeline {
    Pipeline::new(
        Arc::new(provider),
        blob_root.map(|tmp| Arc::new(FsBlobStore::new(tmp.path())) as Arc<dyn BlobSink>),
        db.map(|db| Arc::new(SqliteRecordStore::new(db.clone())) as Arc<dyn RecordSink>),
    )
}

#[tokio::test]
async fn test_full_run_success_with_both_sinks() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    let provider = ScriptedProvider::new(vec![Ok(report_json(&View::ALL))]);
    let pipeline = pipeline_with(provider, Some(&tmp), Some(&db));

    let outcome = pipeline.run(uploads(&View::ALL)).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
    assert!(outcome.error.is_none());
    assert!(outcome.warnings.is_empty());

    let report = outcome.report.unwrap();
    assert_eq!(report.shoe_info.detected_brand_model.as_deref(), Some("Pegasus 40"));

    // All five blobs on disk, namespaced by run id.
    for view in View::ALL {
        let path = tmp
            .path()
            .join("uploads")
            .join(&outcome.run_id)
            .join(format!("{}.jpg", view.label()));
        assert!(path.exists(), "missing blob for {}", view);
    }

    // One record, carrying all five blob references and the audit block.
    let row = run_repo::find_by_id(&db, &outcome.run_id).unwrap().unwrap();
    assert_eq!(row.verdict_status, "YELLOW");
    assert_eq!(row.model_version, "scripted-model");
    assert_eq!(row.decode_blob_refs().unwrap().len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_transient_exhaustion_fails_run_without_record() {
    let db = Database::open_in_memory().unwrap();
    let provider = ScriptedProvider::new(vec![
        Err(transient_503()),
        Err(transient_503()),
        Err(transient_503()),
    ]);
    let pipeline = pipeline_with(provider, None, Some(&db));

    let start = tokio::time::Instant::now();
    let outcome = pipeline.run(uploads(&[View::Outsole])).await;

    assert!(!outcome.is_success());
    assert!(matches!(
        outcome.error,
        Some(AnalysisError::TransientProvider(_))
    ));
    assert!(outcome.error_message().unwrap().contains("503"));
    // Backoff of 1s + 2s was honored before giving up.
    assert!(start.elapsed() >= Duration::from_millis(3000));

    assert_eq!(run_repo::count(&db).unwrap(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_retry_recovers_on_third_attempt() {
    let provider = ScriptedProvider::new(vec![
        Err(transient_503()),
        Err(transient_429()),
        Ok(report_json(&[View::Outsole])),
    ]);
    let pipeline = Pipeline::new(Arc::new(provider), None, None);

    let outcome = pipeline.run(uploads(&[View::Outsole])).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
}

#[tokio::test]
async fn test_fatal_provider_error_fails_immediately() {
    let db = Database::open_in_memory().unwrap();
    let provider = ScriptedProvider::new(vec![Err(fatal_401())]);
    let pipeline = pipeline_with(provider, None, Some(&db));

    let outcome = pipeline.run(uploads(&[View::Outsole])).await;

    assert!(matches!(
        outcome.error,
        Some(AnalysisError::FatalProvider(_))
    ));
    assert_eq!(
        outcome.error_message().unwrap(),
        "Analysis failed. Please check API key and try again."
    );
    assert_eq!(run_repo::count(&db).unwrap(), 0);
}

#[tokio::test]
async fn test_out_of_contract_response_fails_validation_without_record() {
    let db = Database::open_in_memory().unwrap();
    let bad = report_json(&View::ALL).replace("58.0", "150.0");
    let provider = ScriptedProvider::new(vec![Ok(bad)]);
    let pipeline = pipeline_with(provider, None, Some(&db));

    let outcome = pipeline.run(uploads(&View::ALL)).await;

    assert!(matches!(outcome.error, Some(AnalysisError::Validation(_))));
    assert_eq!(
        outcome.error_message().unwrap(),
        "Analysis result validation failed."
    );
    assert_eq!(run_repo::count(&db).unwrap(), 0);
}

#[tokio::test]
async fn test_unparseable_response_fails_validation() {
    let provider = ScriptedProvider::new(vec![Ok("Sorry, I cannot help with that.".into())]);
    let pipeline = Pipeline::new(Arc::new(provider), None, None);

    let outcome = pipeline.run(uploads(&[View::Top])).await;

    assert!(matches!(outcome.error, Some(AnalysisError::Validation(_))));
}

#[tokio::test]
async fn test_one_failed_blob_write_does_not_fail_the_run() {
    let tmp = TempDir::new().unwrap();
    let db = Database::open_in_memory().unwrap();
    let provider = ScriptedProvider::new(vec![Ok(report_json(&View::ALL))]);
    let sink = FlakyBlobSink::new(FsBlobStore::new(tmp.path()), [View::Medial]);
    let pipeline = Pipeline::new(
        Arc::new(provider),
        Some(Arc::new(sink)),
        Some(Arc::new(SqliteRecordStore::new(db.clone()))),
    );

    let outcome = pipeline.run(uploads(&View::ALL)).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
    assert_eq!(outcome.warnings.len(), 1);

    // The record still lands, referencing the four surviving blobs.
    let row = run_repo::find_by_id(&db, &outcome.run_id).unwrap().unwrap();
    let refs = row.decode_blob_refs().unwrap();
    assert_eq!(refs.len(), 4);
    assert!(refs.iter().all(|r| r.view != View::Medial));
}

#[tokio::test]
async fn test_runs_without_any_sinks_configured() {
    let provider = ScriptedProvider::new(vec![Ok(report_json(&[View::Outsole]))]);
    let pipeline = Pipeline::new(Arc::new(provider), None, None);

    let outcome = pipeline.run(uploads(&[View::Outsole])).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
    assert!(outcome.warnings.is_empty());
}

#[tokio::test]
async fn test_empty_submission_still_invokes_the_model() {
    let provider = ScriptedProvider::always(&report_json(&[]));
    let pipeline = Pipeline::new(Arc::new(provider), None, None);

    let outcome = pipeline.run(uploads(&[])).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
    let report = outcome.report.unwrap();
    assert_eq!(report.analysis_audit.missing_views.len(), 5);
}

#[tokio::test]
async fn test_context_block_reflects_the_submission() {
    let provider = Arc::new(ScriptedProvider::always(&report_json(&[
        View::Outsole,
        View::Heel,
    ])));
    let pipeline = Pipeline::new(provider.clone(), None, None);

    let outcome = pipeline.run(uploads(&[View::Outsole, View::Heel])).await;

    assert!(outcome.is_success(), "run failed: {:?}", outcome.error);
    assert_eq!(provider.calls(), 1);

    let request = provider.last_request().unwrap();
    assert_eq!(request.image_parts.len(), 2);
    assert!(request
        .context_block
        .contains("Views present: OUTSOLE, HEEL"));
    assert!(request
        .context_block
        .contains("Missing views: LATERAL, MEDIAL, TOP"));
}

#[tokio::test]
async fn test_identical_submissions_produce_independent_records() {
    let db = Database::open_in_memory().unwrap();
    let provider = ScriptedProvider::always(&report_json(&[View::Outsole]));
    let pipeline = pipeline_with(provider, None, Some(&db));

    let first = pipeline.run(uploads(&[View::Outsole])).await;
    let second = pipeline.run(uploads(&[View::Outsole])).await;

    assert!(first.is_success());
    assert!(second.is_success());
    assert_ne!(first.run_id, second.run_id);
    assert_eq!(run_repo::count(&db).unwrap(), 2);
    assert!(run_repo::find_by_id(&db, &first.run_id).unwrap().is_some());
    assert!(run_repo::find_by_id(&db, &second.run_id).unwrap().is_some());
}
