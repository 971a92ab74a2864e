//! Environment-driven configuration.
//!
//! The pipeline is configured entirely through the process environment.
//! Only the model API key is required; either persistence sink may be
//! left unconfigured, in which case the pipeline runs without durability.

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Model used when `SOLESCAN_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";

/// Endpoint base used when `SOLESCAN_API_BASE` is not set. Overridable
/// so tests and staging can point the client at a local stub.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GEMINI_API_KEY is not set")]
    MissingApiKey,
}

#[derive(Clone)]
pub struct Config {
    /// Model provider API key.
    pub api_key: SecretString,
    /// Model identifier, e.g. `gemini-3-pro-preview`.
    pub model: String,
    /// Base URL of the model endpoint.
    pub api_base: String,
    /// Root directory for the blob sink. `None` disables blob writes.
    pub uploads_dir: Option<PathBuf>,
    /// SQLite path for the record sink. `None` disables record writes.
    pub database_path: Option<PathBuf>,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// `GEMINI_API_KEY` is required. `SOLESCAN_MODEL`, `SOLESCAN_API_BASE`,
    /// `SOLESCAN_UPLOADS_DIR` and `SOLESCAN_DB_PATH` are optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = read_env("GEMINI_API_KEY").ok_or(ConfigError::MissingApiKey)?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            model: read_env("SOLESCAN_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base: read_env("SOLESCAN_API_BASE")
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            uploads_dir: read_env("SOLESCAN_UPLOADS_DIR").map(PathBuf::from),
            database_path: read_env("SOLESCAN_DB_PATH").map(PathBuf::from),
        })
    }
}

/// Reads a variable, treating empty values as unset.
fn read_env(name: &str) -> Option<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}
