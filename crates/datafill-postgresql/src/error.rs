//! Error types for the PostgreSQL connector.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while talking to PostgreSQL.
#[derive(Error, Debug)]
pub enum PostgreSQLConnectorError {
    /// PostgreSQL connection or query error.
    #[error("PostgreSQL error: {0}")]
    PostgreSQL(#[from] tokio_postgres::Error),

    /// Rows could not be encoded as JSON.
    #[error("Failed to encode rows: {0}")]
    Encode(#[from] serde_json::Error),

    /// Trigger backup file could not be read or written.
    #[error("Failed to access trigger backup {path}: {source}")]
    BackupIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Trigger backup file is not valid YAML.
    #[error("Invalid trigger backup: {0}")]
    BackupFormat(#[from] serde_yaml::Error),
}
