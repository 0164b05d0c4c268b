//! Error types for row decoding and log file loading.
//!
//! Decoding a single row yields a [`DecodeError`]; everything that touches the
//! filesystem or a whole log file is reported through [`Error`].

use std::path::PathBuf;

use thiserror::Error;

use crate::location::LocationError;

/// Result alias for file-level operations
pub type Result<T> = std::result::Result<T, Error>;

/// The kind of value a column was expected to hold
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub enum ValueKind {
    #[strum(serialize = "date/time")]
    DateTime,
    #[strum(serialize = "integer")]
    Integer,
    #[strum(serialize = "decimal number")]
    Float,
    #[strum(serialize = "boolean")]
    Boolean,
}

/// Failure to decode one log row into a [`crate::Record`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },

    #[error("column {index} ({column}): invalid {kind} {value:?}")]
    InvalidField {
        index: usize,
        column: String,
        value: String,
        kind: ValueKind,
    },

    #[error(transparent)]
    Location(#[from] LocationError),
}

impl DecodeError {
    /// Column index of the offending field, if the error is tied to one
    pub fn column_index(&self) -> Option<usize> {
        match self {
            DecodeError::InvalidField { index, .. } => Some(*index),
            DecodeError::ColumnCount { .. } | DecodeError::Location(_) => None,
        }
    }
}

/// Errors raised while loading log files and settings
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing LeafSpy header line")]
    MissingHeader,

    #[error("line {line}: {source}")]
    Row {
        line: usize,
        #[source]
        source: DecodeError,
    },

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}

impl Error {
    /// Create an I/O error tagged with the path being accessed
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
