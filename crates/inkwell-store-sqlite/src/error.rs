//! Error type for `inkwell-store-sqlite`.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] inkwell_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("io error at {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("project already exists: {0}")]
  AlreadyExists(String),

  #[error("project not found: {0}")]
  ProjectNotFound(String),

  #[error("unknown table: {0}")]
  UnknownTable(String),

  #[error("unknown column {column:?} in table {table}")]
  UnknownColumn { table: String, column: String },

  #[error("row {row_id} not found in table {table}")]
  RowNotFound { table: String, row_id: i64 },

  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("constraint violation in table {table}: {message}")]
  ConstraintViolation { table: String, message: String },

  /// `row` is the 1-based position of the offending data row, if the values
  /// came from a multi-row import.
  #[error(
    "table {table} expects {expected} values per row, got {actual}{}",
    row_suffix(.row)
  )]
  RowShapeMismatch {
    table:    String,
    expected: usize,
    actual:   usize,
    row:      Option<usize>,
  },

  #[error("table {0} is append-only")]
  AppendOnly(String),
}

fn row_suffix(row: &Option<usize>) -> String {
  row.map(|r| format!(" (row {r})")).unwrap_or_default()
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  /// Lift core errors that have a direct counterpart here.
  pub(crate) fn from_core(err: inkwell_core::Error) -> Self {
    match err {
      inkwell_core::Error::UnknownTable(t) => Self::UnknownTable(t),
      inkwell_core::Error::InvalidIdentifier(i) => Self::InvalidIdentifier(i),
      other => Self::Core(other),
    }
  }

  /// Map an SQLite constraint failure on `table` to [`Error::ConstraintViolation`].
  pub(crate) fn from_sqlite(table: &str, err: rusqlite::Error) -> Self {
    match err {
      rusqlite::Error::SqliteFailure(code, msg)
        if code.code == rusqlite::ErrorCode::ConstraintViolation =>
      {
        Self::ConstraintViolation {
          table:   table.to_owned(),
          message: msg.unwrap_or_else(|| code.to_string()),
        }
      }
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
