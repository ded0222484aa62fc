// src/catalog/error.rs

use thiserror::Error;

use super::definitions::RowId;

pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types for catalog operations. None of these are fatal: every one is
/// recoverable by a forced refresh or by repeating the user action, and the
/// core never retries on its own.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// Transport or HTTP failure anywhere in a store call. A fetch aborts
    /// entirely; a write call reports whole-call failure.
    #[error("Row store unavailable: {0}")]
    StoreUnavailable(String),

    /// Working and original snapshots disagree on their row-id sets. Blocks
    /// the diff; no writes are attempted.
    #[error("Snapshot alignment mismatch (ids missing from original: {missing_from_original:?}; ids missing from working: {missing_from_working:?})")]
    AlignmentMismatch {
        missing_from_original: Vec<RowId>,
        missing_from_working: Vec<RowId>,
    },

    /// Required configuration fields are absent. Surfaced before any store
    /// call is attempted.
    #[error("Configuration incomplete: missing {missing:?}")]
    ConfigIncomplete { missing: Vec<&'static str> },

    /// An edit touched a column merged in from the secondary table. The
    /// primary table is the only write target, so these are rejected before
    /// any write.
    #[error("Column '{0}' is read-only in the merged catalog")]
    ReadOnlyColumn(String),

    /// Local I/O failure (settings file, export target).
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        CatalogError::StoreUnavailable(err.to_string())
    }
}
