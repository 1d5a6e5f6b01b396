//! Error taxonomy for ingestion runs and the read-side view.
//!
//! Record and object level errors are collected into the run report instead
//! of aborting the run. Only [`RebuildError`] is fatal to a refresh.

use std::path::PathBuf;
use thiserror::Error;

/// A source object could not be listed or fetched
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("request for {object} failed: {message}")]
    Unreachable { object: String, message: String },

    #[error("request for {object} returned HTTP {status}")]
    Status { object: String, status: u16 },

    #[error("failed to read {object}: {source}")]
    Io {
        object: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected response for {object}: {message}")]
    InvalidResponse { object: String, message: String },

    #[error("object not found: {0}")]
    NotFound(String),
}

impl RetrievalError {
    /// Whether another attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            RetrievalError::Unreachable { .. } => true,
            RetrievalError::Status { status, .. } => *status == 429 || *status >= 500,
            RetrievalError::Io { .. }
            | RetrievalError::InvalidResponse { .. }
            | RetrievalError::NotFound(_) => false,
        }
    }
}

/// Malformed document or record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("invalid {format} document: {message}")]
    Document { format: &'static str, message: String },

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not an integer: {value:?}")]
    InvalidKey { field: &'static str, value: String },

    #[error("invalid record: {0}")]
    Record(String),
}

/// A field whose raw text does not match its expected encoding
#[derive(Debug, Clone, PartialEq, Error)]
#[error("field `{field}` value {value:?} is not a valid {expected}")]
pub struct NormalizationError {
    pub field: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// An insert that SQLite rejected
#[derive(Debug, Error)]
#[error("insert into {table} failed for key {key}: {source}")]
pub struct LoadError {
    pub table: &'static str,
    pub key: String,
    #[source]
    pub source: rusqlite::Error,
}

/// Any error reported against a single object or record
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Load(#[from] LoadError),
}

impl IngestError {
    /// Short label used in structured logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            IngestError::Retrieval(_) => "retrieval",
            IngestError::Parse(_) => "parse",
            IngestError::Normalization(_) => "normalization",
            IngestError::Load(_) => "load",
        }
    }
}

/// Failures that abort a refresh
#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("a rebuild is already in progress (remove {0:?} if no refresh is running)")]
    AlreadyRunning(PathBuf),

    #[error("failed to create rebuild marker {path:?}: {source}")]
    Marker {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to remove database file {path:?}: {source}")]
    RemoveDatabase {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open database {path:?}: {source}")]
    OpenDatabase {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create table {table}: {source}")]
    Schema {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to list source objects: {0}")]
    Listing(#[source] RetrievalError),

    #[error("failed to finalize database: {0}")]
    Finalize(#[source] rusqlite::Error),
}

/// Read-side failures
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("database is being rebuilt")]
    RebuildInProgress,

    #[error("database not found at {0:?}")]
    Missing(PathBuf),

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let server = RetrievalError::Status {
            object: "a".into(),
            status: 503,
        };
        let throttled = RetrievalError::Status {
            object: "a".into(),
            status: 429,
        };
        let denied = RetrievalError::Status {
            object: "a".into(),
            status: 403,
        };
        assert!(server.is_transient());
        assert!(throttled.is_transient());
        assert!(!denied.is_transient());
        assert!(!RetrievalError::NotFound("a".into()).is_transient());
    }

    #[test]
    fn test_ingest_error_kind() {
        let err: IngestError = ParseError::MissingField("flightNumber").into();
        assert_eq!(err.kind(), "parse");
        assert_eq!(err.to_string(), "missing field `flightNumber`");
    }
}
