//! Run repository — row mapping for the `runs` table.

use rusqlite::{params, Row};

use crate::report::ForensicReport;
use crate::storage::BlobRef;
use crate::views::View;

use super::record::PersistenceRecord;
use super::{Database, DatabaseError};

/// A raw run row from the database. JSON columns stay as text; use the
/// decode helpers where typed access is needed.
#[derive(Debug, Clone)]
pub struct RunRow {
    pub run_id: String,
    pub created_at: String,
    pub brand_model: Option<String>,
    pub verdict_status: String,
    pub blob_refs: String,
    pub report: String,
    pub received_views: String,
    pub missing_views: String,
    pub model_version: String,
}

impl RunRow {
    fn from_row(row: &Row<'_>) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            run_id: row.get("run_id")?,
            created_at: row.get("created_at")?,
            brand_model: row.get("brand_model")?,
            verdict_status: row.get("verdict_status")?,
            blob_refs: row.get("blob_refs")?,
            report: row.get("report")?,
            received_views: row.get("received_views")?,
            missing_views: row.get("missing_views")?,
            model_version: row.get("model_version")?,
        })
    }

    pub fn decode_report(&self) -> Result<ForensicReport, DatabaseError> {
        serde_json::from_str(&self.report).map_err(|e| DatabaseError::Encode {
            column: "report",
            source: e,
        })
    }

    pub fn decode_blob_refs(&self) -> Result<Vec<BlobRef>, DatabaseError> {
        serde_json::from_str(&self.blob_refs).map_err(|e| DatabaseError::Encode {
            column: "blob_refs",
            source: e,
        })
    }
}

fn encode<T: serde::Serialize>(
    column: &'static str,
    value: &T,
) -> Result<String, DatabaseError> {
    serde_json::to_string(value).map_err(|e| DatabaseError::Encode { column, source: e })
}

/// Inserts a new run record. A duplicate run id is a constraint error,
/// not an overwrite.
pub fn insert(db: &Database, record: &PersistenceRecord) -> Result<(), DatabaseError> {
    let blob_refs = encode("blob_refs", &record.blob_refs)?;
    let report = encode("report", &record.report)?;
    let received = encode("received_views", &record.audit.received_views)?;
    let missing = encode("missing_views", &record.audit.missing_views)?;

    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO runs (run_id, created_at, brand_model, verdict_status, blob_refs,
             report, received_views, missing_views, model_version)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.run_id,
                record.created_at.to_rfc3339(),
                record.brand_model,
                record.verdict_status.label(),
                blob_refs,
                report,
                received,
                missing,
                record.audit.model_version,
            ],
        )?;
        Ok(())
    })
}

/// Finds a run record by its id.
pub fn find_by_id(db: &Database, run_id: &str) -> Result<Option<RunRow>, DatabaseError> {
    db.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT * FROM runs WHERE run_id = ?1")?;
        let mut rows = stmt.query_map(params![run_id], RunRow::from_row)?;
        match rows.next() {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::Sqlite(e)),
            None => Ok(None),
        }
    })
}

/// Counts stored run records.
pub fn count(db: &Database) -> Result<u64, DatabaseError> {
    db.with_conn(|conn| {
        let count: u64 = conn.query_row("SELECT COUNT(*) FROM runs", [], |r| r.get(0))?;
        Ok(count)
    })
}
