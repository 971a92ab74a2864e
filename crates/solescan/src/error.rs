use thiserror::Error;

#[derive(Error, Debug)]
pub enum SolescanError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] crate::db::DatabaseError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] crate::pipeline::AnalysisError),
}

pub type Result<T> = std::result::Result<T, SolescanError>;
