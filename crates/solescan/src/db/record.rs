//! The durable run record and the record sink seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::report::{ForensicReport, StatusColor};
use crate::storage::BlobRef;
use crate::views::View;

use super::{run_repo, Database, DatabaseError};

/// Audit block persisted alongside the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordAudit {
    pub received_views: Vec<View>,
    pub missing_views: Vec<View>,
    pub model_version: String,
}

/// Terminal snapshot of a successful run. Created once, after
/// validation; never updated.
#[derive(Debug, Clone)]
pub struct PersistenceRecord {
    pub run_id: String,
    pub created_at: DateTime<Utc>,
    /// Denormalized from the report for cheap listing queries.
    pub brand_model: Option<String>,
    pub verdict_status: StatusColor,
    /// References to whichever blob writes succeeded.
    pub blob_refs: Vec<BlobRef>,
    pub report: ForensicReport,
    pub audit: RecordAudit,
}

impl PersistenceRecord {
    /// Builds the record from a validated report and the surviving blob
    /// references.
    pub fn new(
        run_id: &str,
        report: ForensicReport,
        blob_refs: Vec<BlobRef>,
        received_views: Vec<View>,
        missing_views: Vec<View>,
        model_version: &str,
    ) -> Self {
        Self {
            run_id: run_id.to_string(),
            created_at: Utc::now(),
            brand_model: report.shoe_info.detected_brand_model.clone(),
            verdict_status: report.verdict.status_code,
            blob_refs,
            report,
            audit: RecordAudit {
                received_views,
                missing_views,
                model_version: model_version.to_string(),
            },
        }
    }
}

/// A long-lived, concurrency-safe handle to the record store.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Writes one record keyed by run id. Duplicate keys are an error —
    /// records are never overwritten.
    async fn put_record(&self, record: &PersistenceRecord) -> Result<(), DatabaseError>;
}

/// SQLite-backed record sink.
pub struct SqliteRecordStore {
    db: Database,
}

impl SqliteRecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordSink for SqliteRecordStore {
    async fn put_record(&self, record: &PersistenceRecord) -> Result<(), DatabaseError> {
        run_repo::insert(&self.db, record)
    }
}
