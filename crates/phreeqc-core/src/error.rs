//! Error types for variant values, table indexing and engine calls.

use std::fmt;

use thiserror::Error;

/// The axis an index key addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => f.write_str("Row"),
            Axis::Column => f.write_str("Column"),
        }
    }
}

/// Errors that can occur while converting values or reading result tables.
#[derive(Error, Debug)]
pub enum PhreeqcError {
    /// A dynamically typed value has no variant kind (e.g. a JSON bool).
    #[error("Unsupported value type: {0}")]
    TypeMismatch(String),

    /// A raw variant carried a kind tag or result code outside the known set.
    #[error("Invalid variant state: {0}")]
    InvalidState(String),

    /// An index key was neither an integer nor a slice.
    #[error("{axis} index must be int or slice")]
    IndexType { axis: Axis },

    /// More keys than the table has axes.
    #[error("Too many indices for a 2-dimensional table: {0}")]
    TooManyIndices(usize),

    #[error("Slice step cannot be zero")]
    ZeroStep,

    /// Failure reported by the engine, passed through with its own text.
    #[error("Engine error: {0}")]
    Engine(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout phreeqc-core.
pub type Result<T> = std::result::Result<T, PhreeqcError>;
