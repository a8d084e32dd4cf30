//! Error types for chainql

use std::time::Duration;
use thiserror::Error;

/// Result type alias for builder steps.
pub type QbResult<T> = Result<T, QbError>;

/// The error a builder chain captures and keeps.
///
/// Only the first failure of a chain is recorded; it stays on the builder until
/// inspected or surfaced by an execution call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QbError {
    /// The catalog does not know the table.
    #[error("table '{table}' does not exist")]
    TableNotFound { table: String },

    /// A selected column is not part of the table.
    #[error(
        "column '{column}' does not exist on table '{table}' (available columns: {})",
        .available.join(", ")
    )]
    ColumnNotFound {
        column: String,
        table: String,
        available: Vec<String>,
    },

    /// The catalog lookup itself failed.
    #[error("schema query failed: {cause}")]
    SchemaQueryFailed { cause: String },

    /// An operation that needs a validated table ran before `from`/`delete`.
    #[error("no table selected before {operation}")]
    NoTable { operation: &'static str },
}

impl QbError {
    pub fn table_not_found(table: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
        }
    }

    pub fn schema_query_failed(cause: impl std::fmt::Display) -> Self {
        Self::SchemaQueryFailed {
            cause: cause.to_string(),
        }
    }
}

/// Result type alias for execution.
pub type ChainResult<T> = Result<T, ChainError>;

/// Errors returned by terminal (execution) calls.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The builder was already in an error state; nothing was sent.
    #[error("Query builder error: {0}")]
    Builder(#[from] QbError),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// SQLite execution error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl ChainError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// The builder error, if execution never reached the database.
    pub fn as_builder(&self) -> Option<&QbError> {
        match self {
            Self::Builder(err) => Some(err),
            _ => None,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
