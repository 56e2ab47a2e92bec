//! Checking bucket source directories for their required artifacts.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use serde::Serialize;
use strum::IntoEnumIterator as _;

use crate::{
  Error,
  artifact::{ArtifactKind, format_size},
};

/// Size of one artifact in a complete bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSize {
  pub kind:  ArtifactKind,
  pub bytes: u64,
}

impl ArtifactSize {
  /// `12.4MB`
  pub fn display_size(&self) -> String { format_size(self.bytes) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BucketStatus {
  MissingDirectory,
  MissingFiles { missing: Vec<ArtifactKind> },
  Complete { sizes: Vec<ArtifactSize> },
}

/// What [`discover`] found for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketReport {
  pub name:   String,
  /// `None` when no source root was configured for the bucket.
  pub source: Option<PathBuf>,
  pub status: BucketStatus,
}

impl BucketReport {
  pub fn is_complete(&self) -> bool { matches!(self.status, BucketStatus::Complete { .. }) }

  /// The [`Error::IncompleteBucket`] describing this report, if any.
  pub fn incompleteness(&self) -> Option<Error> {
    let missing = match &self.status {
      BucketStatus::Complete { .. } => return None,
      BucketStatus::MissingDirectory => Vec::new(),
      BucketStatus::MissingFiles { missing } => missing.clone(),
    };
    Some(Error::IncompleteBucket { bucket: self.name.clone(), missing })
  }
}

/// Inspect one bucket directory.
pub fn inspect(dir: &Path) -> BucketStatus {
  if !dir.is_dir() {
    return BucketStatus::MissingDirectory;
  }

  let mut missing = Vec::new();
  let mut sizes = Vec::new();
  for kind in ArtifactKind::iter() {
    match dir.join(kind.file_name()).metadata() {
      Ok(meta) if meta.is_file() => sizes.push(ArtifactSize { kind, bytes: meta.len() }),
      _ => missing.push(kind),
    }
  }

  if missing.is_empty() {
    BucketStatus::Complete { sizes }
  } else {
    BucketStatus::MissingFiles { missing }
  }
}

/// Check each named bucket against its configured source root.
///
/// One report per name, in the order given. Nothing is read beyond file
/// metadata.
pub fn discover<S: AsRef<str>>(names: &[S], roots: &BTreeMap<String, PathBuf>) -> Vec<BucketReport> {
  names
    .iter()
    .map(|name| {
      let name = name.as_ref();
      let source = roots.get(name).cloned();
      let status = source
        .as_deref()
        .map_or(BucketStatus::MissingDirectory, inspect);
      tracing::debug!(bucket = name, ?status, "bucket inspected");
      BucketReport { name: name.to_owned(), source, status }
    })
    .collect()
}
