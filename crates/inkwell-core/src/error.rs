//! Error types for `inkwell-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),

  #[error("invalid project name: {0:?}")]
  InvalidProjectName(String),

  #[error("unknown table: {0}")]
  UnknownTable(String),

  #[error("invalid draft version: {0} (versions start at 1)")]
  InvalidDraftVersion(u32),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
