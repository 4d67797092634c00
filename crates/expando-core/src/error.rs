//! Error type shared by table loading and expansion.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExpandoError>;

#[derive(Debug, Error)]
pub enum ExpandoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A key was inserted twice into a table loaded with the strict policy.
    #[error("Duplicate key {key} in table {table}")]
    DuplicateKey { table: String, key: String },

    #[error("Malformed row on line {line}: expected at least 2 columns, found {found}")]
    MalformedRow { line: u64, found: usize },

    #[error("Unknown lookup table: {0}")]
    UnknownTable(String),

    #[error("Invalid separator {separator:?}: {reason}")]
    InvalidSeparator {
        separator: String,
        reason: &'static str,
    },

    /// A `column:table` spec that does not split into exactly two parts.
    #[error("Invalid column map entry {0:?}, expected COLUMN:TABLE")]
    InvalidColumnMap(String),

    #[error(
        "Table {table} stores values split on {existing:?}, cannot load values split on {requested:?}"
    )]
    ValueShapeMismatch {
        table: String,
        existing: Option<String>,
        requested: Option<String>,
    },
}

impl ExpandoError {
    pub(crate) fn invalid_separator(separator: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidSeparator {
            separator: separator.into(),
            reason,
        }
    }
}
