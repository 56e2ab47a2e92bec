//! The files a bucket directory must hold.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// One of the four precomputed artifacts of a knowledge bucket.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  AsRefStr,
  EnumIter,
  EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
  /// The full-document key-value store.
  Documents,
  Entities,
  Relationships,
  Chunks,
}

impl ArtifactKind {
  pub fn file_name(self) -> &'static str {
    match self {
      Self::Documents => "kv_store_full_docs.json",
      Self::Entities => "vdb_entities.json",
      Self::Relationships => "vdb_relationships.json",
      Self::Chunks => "vdb_chunks.json",
    }
  }
}

const MIB: f64 = 1024.0 * 1024.0;

/// Human-scale file size, always in megabytes: `12.4MB`.
pub fn format_size(bytes: u64) -> String { format!("{:.1}MB", bytes as f64 / MIB) }

#[cfg(test)]
mod tests {
  use strum::IntoEnumIterator as _;

  use super::*;

  #[test]
  fn every_kind_has_a_distinct_file() {
    let mut files: Vec<_> = ArtifactKind::iter().map(ArtifactKind::file_name).collect();
    files.sort();
    files.dedup();
    assert_eq!(files.len(), 4);
  }

  #[test]
  fn kinds_parse_from_their_names() {
    assert_eq!("entities".parse::<ArtifactKind>().unwrap(), ArtifactKind::Entities);
    assert_eq!(ArtifactKind::Chunks.to_string(), "chunks");
  }

  #[test]
  fn sizes_render_in_megabytes() {
    assert_eq!(format_size(0), "0.0MB");
    assert_eq!(format_size(13_002_342), "12.4MB");
    assert_eq!(format_size(1024 * 1024), "1.0MB");
  }
}
