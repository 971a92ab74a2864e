pub mod config;
pub mod db;
pub mod error;
pub mod pipeline;
pub mod provider;
pub mod report;
pub mod storage;
pub mod views;

pub use config::{Config, ConfigError, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use db::{Database, PersistenceRecord, RecordSink, SqliteRecordStore};
pub use error::{Result, SolescanError};
pub use pipeline::{AnalysisError, Pipeline, RunOutcome, RunWarning};
pub use provider::{GeminiClient, ModelProvider};
pub use report::ForensicReport;
pub use storage::{BlobRef, BlobSink, FsBlobStore};
pub use views::{collect_views, View, ViewImage};
