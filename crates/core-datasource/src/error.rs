//! Datasource-side error kinds (§7 "DatasourceIOError", "MissingAsset").

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasourceError {
    #[error("datasource I/O error: {0}")]
    Io(String),
    #[error("datasource query error: {0}")]
    Query(String),
}
