//! Best-effort content counts for buckets.
//!
//! Counting never fails: a missing or unreadable artifact counts as zero.

use std::{fs, path::Path};

use serde::Serialize;
use serde_json::Value;

use crate::artifact::ArtifactKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BucketStats {
  pub name:          String,
  pub documents:     usize,
  pub entities:      usize,
  pub relationships: usize,
  pub chunks:        usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsTotals {
  pub documents:     usize,
  pub entities:      usize,
  pub relationships: usize,
  pub chunks:        usize,
}

impl StatsTotals {
  fn add(&mut self, stats: &BucketStats) {
    self.documents += stats.documents;
    self.entities += stats.entities;
    self.relationships += stats.relationships;
    self.chunks += stats.chunks;
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsReport {
  pub buckets: Vec<BucketStats>,
  pub totals:  StatsTotals,
}

impl StatsReport {
  pub fn get(&self, name: &str) -> Option<&BucketStats> { self.buckets.iter().find(|b| b.name == name) }
}

impl FromIterator<BucketStats> for StatsReport {
  fn from_iter<I: IntoIterator<Item = BucketStats>>(iter: I) -> Self {
    let mut report = Self::default();
    for stats in iter {
      report.totals.add(&stats);
      report.buckets.push(stats);
    }
    report
  }
}

fn read_json(path: &Path) -> Option<Value> {
  let text = match fs::read_to_string(path) {
    Ok(text) => text,
    Err(e) => {
      tracing::debug!(path = %path.display(), error = %e, "artifact not readable");
      return None;
    }
  };
  match serde_json::from_str(&text) {
    Ok(value) => Some(value),
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "artifact is not valid json");
      None
    }
  }
}

fn collection_len(value: &Value) -> usize {
  match value {
    Value::Array(items) => items.len(),
    Value::Object(map) => map.len(),
    _ => 0,
  }
}

/// Number of entries under the artifact's `data` field. The full-document
/// store has no `data` field; its top-level keys are the documents.
fn count(dir: &Path, kind: ArtifactKind) -> usize {
  let Some(value) = read_json(&dir.join(kind.file_name())) else {
    return 0;
  };
  match kind {
    ArtifactKind::Documents => collection_len(&value),
    _ => value.get("data").map_or(0, collection_len),
  }
}

/// Counts for one bucket stored in `dir`.
pub fn bucket_stats(name: &str, dir: &Path) -> BucketStats {
  BucketStats {
    name:          name.to_owned(),
    documents:     count(dir, ArtifactKind::Documents),
    entities:      count(dir, ArtifactKind::Entities),
    relationships: count(dir, ArtifactKind::Relationships),
    chunks:        count(dir, ArtifactKind::Chunks),
  }
}

/// Counts for every named bucket under `working_dir`, plus totals.
///
/// Bucket `n` is read from `<working_dir>/<n>`. Nothing is written.
pub fn compute_stats<S: AsRef<str>>(working_dir: &Path, names: &[S]) -> StatsReport {
  names
    .iter()
    .map(|name| bucket_stats(name.as_ref(), &working_dir.join(name.as_ref())))
    .collect()
}
