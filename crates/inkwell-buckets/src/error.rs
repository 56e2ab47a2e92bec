//! Error type for `inkwell-buckets`.

use std::path::PathBuf;

use thiserror::Error;

use crate::artifact::ArtifactKind;

#[derive(Debug, Error)]
pub enum Error {
  #[error("io error at {}: {source}", .path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("json error in {}: {source}", .path.display())]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("bucket {bucket} is incomplete: {}", describe_missing(.missing))]
  IncompleteBucket {
    bucket:  String,
    /// Empty when the source directory itself is missing.
    missing: Vec<ArtifactKind>,
  },

  #[error("could not link bucket {bucket}: {reason}")]
  LinkFailure { bucket: String, reason: String },

  #[error("invalid bucket configuration: {0}")]
  InvalidConfig(String),
}

fn describe_missing(missing: &[ArtifactKind]) -> String {
  if missing.is_empty() {
    return String::from("source directory not found");
  }
  let files: Vec<&str> = missing.iter().map(|k| k.file_name()).collect();
  format!("missing {}", files.join(", "))
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Self::Io { path: path.into(), source }
  }

  pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
    Self::Json { path: path.into(), source }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
