//! The bucket registry configuration read by the retrieval engine.
//!
//! On disk this is a pretty-printed JSON document:
//!
//! ```json
//! {
//!   "buckets": ["scripts", "books"],
//!   "metadata": { "scripts": { "name": "scripts", "description": "...", ... } },
//!   "active": ["scripts"]
//! }
//! ```

use std::{
  collections::BTreeMap,
  fs,
  io::Write as _,
  path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, stats::StatsReport};

// ─── Input ───────────────────────────────────────────────────────────────────

/// How a bucket is declared by whoever configures the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSpec {
  /// Directory holding the bucket's artifacts.
  pub source:      PathBuf,
  #[serde(default)]
  pub description: String,
  #[serde(default = "default_active")]
  pub active:      bool,
}

fn default_active() -> bool { true }

/// Where a configuration came from and when. Supplied by the caller so that
/// building a configuration is deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
  /// A free-form label for the bucket set, e.g. `legacy_import_2`.
  pub source:      String,
  pub recorded_at: DateTime<Utc>,
}

// ─── Output ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketMetadata {
  pub name:               String,
  pub description:        String,
  pub created_at:         DateTime<Utc>,
  pub document_count:     usize,
  pub entity_count:       usize,
  pub relationship_count: usize,
  pub last_updated:       DateTime<Utc>,
  pub source:             String,
  pub working_dir:        PathBuf,
}

/// The persisted registry configuration.
///
/// Every name in `active` is a key of `metadata`; [`BucketConfig::validate`]
/// checks this and every mutator here preserves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketConfig {
  pub buckets:  Vec<String>,
  pub metadata: BTreeMap<String, BucketMetadata>,
  pub active:   Vec<String>,
}

/// Build a configuration listing every bucket in `buckets`, with those marked
/// active in the active list. Counts start at zero; see
/// [`BucketConfig::apply_stats`].
pub fn build_configuration(
  buckets: &BTreeMap<String, BucketSpec>,
  provenance: &Provenance,
) -> BucketConfig {
  let mut config = BucketConfig::default();

  for (name, spec) in buckets {
    config.buckets.push(name.clone());
    config.metadata.insert(name.clone(), BucketMetadata {
      name:               name.clone(),
      description:        spec.description.clone(),
      created_at:         provenance.recorded_at,
      document_count:     0,
      entity_count:       0,
      relationship_count: 0,
      last_updated:       provenance.recorded_at,
      source:             provenance.source.clone(),
      working_dir:        spec.source.clone(),
    });
    if spec.active {
      config.active.push(name.clone());
    }
  }

  config
}

impl BucketConfig {
  pub fn is_active(&self, name: &str) -> bool { self.active.iter().any(|a| a == name) }

  /// Copy counts from `stats` into the matching metadata entries. Buckets the
  /// report does not mention are left alone.
  pub fn apply_stats(&mut self, stats: &StatsReport) {
    for bucket in &stats.buckets {
      if let Some(meta) = self.metadata.get_mut(&bucket.name) {
        meta.document_count = bucket.documents;
        meta.entity_count = bucket.entities;
        meta.relationship_count = bucket.relationships;
      }
    }
  }

  /// Mark a known bucket active. Returns whether anything changed.
  pub fn activate(&mut self, name: &str) -> Result<bool> {
    if !self.metadata.contains_key(name) {
      return Err(Error::InvalidConfig(format!("unknown bucket {name}")));
    }
    if self.is_active(name) {
      return Ok(false);
    }
    self.active.push(name.to_owned());
    Ok(true)
  }

  /// Remove a bucket from the active list. Returns whether it was active.
  pub fn deactivate(&mut self, name: &str) -> bool {
    let before = self.active.len();
    self.active.retain(|a| a != name);
    self.active.len() != before
  }

  pub fn validate(&self) -> Result<()> {
    if let Some(stray) = self.active.iter().find(|a| !self.metadata.contains_key(*a)) {
      return Err(Error::InvalidConfig(format!(
        "active bucket {stray} has no metadata entry"
      )));
    }
    if let Some(stray) = self.buckets.iter().find(|b| !self.metadata.contains_key(*b)) {
      return Err(Error::InvalidConfig(format!("bucket {stray} has no metadata entry")));
    }
    Ok(())
  }

  /// Read and validate a persisted configuration.
  pub fn load(path: &Path) -> Result<Self> {
    let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let config: Self = serde_json::from_str(&text).map_err(|e| Error::json(path, e))?;
    config.validate()?;
    Ok(config)
  }
}

// ─── Persistence ─────────────────────────────────────────────────────────────

/// Write `config` to `path`, replacing any existing file.
///
/// The document is written to a temporary file in the same directory and
/// renamed over `path`, so readers see either the old file or the new one.
pub fn persist(config: &BucketConfig, path: &Path) -> Result<()> {
  config.validate()?;

  let dir = match path.parent() {
    Some(p) if !p.as_os_str().is_empty() => p,
    _ => Path::new("."),
  };
  fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

  let mut body = serde_json::to_vec_pretty(config).map_err(|e| Error::json(path, e))?;
  body.push(b'\n');

  let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
  tmp.write_all(&body).map_err(|e| Error::io(tmp.path(), e))?;
  tmp.as_file().sync_all().map_err(|e| Error::io(tmp.path(), e))?;
  tmp.persist(path).map_err(|e| Error::io(path, e.error))?;

  tracing::info!(
    path = %path.display(),
    buckets = config.buckets.len(),
    active = config.active.len(),
    "bucket configuration written"
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;
  use crate::stats::BucketStats;

  fn provenance() -> Provenance {
    Provenance {
      source:      "legacy_import_2".into(),
      recorded_at: Utc.with_ymd_and_hms(2025, 8, 13, 14, 27, 31).unwrap(),
    }
  }

  fn spec(source: &str, active: bool) -> BucketSpec {
    BucketSpec { source: source.into(), description: format!("{source} bucket"), active }
  }

  #[test]
  fn active_is_always_a_subset_of_metadata() {
    let inputs: Vec<BTreeMap<String, BucketSpec>> = vec![
      BTreeMap::new(),
      BTreeMap::from([("a".into(), spec("/a", true))]),
      BTreeMap::from([("a".into(), spec("/a", false))]),
      BTreeMap::from([
        ("a".into(), spec("/a", true)),
        ("b".into(), spec("/b", false)),
        ("c".into(), spec("/c", true)),
      ]),
    ];

    for input in &inputs {
      let config = build_configuration(input, &provenance());
      assert!(config.active.iter().all(|a| config.metadata.contains_key(a)));
      assert_eq!(config.metadata.len(), input.len());
      assert_eq!(config.buckets.len(), input.len());
      config.validate().unwrap();
    }
  }

  #[test]
  fn build_is_deterministic() {
    let input: BTreeMap<String, BucketSpec> = BTreeMap::from([("b".into(), spec("/b", true)), ("a".into(), spec("/a", false))]);
    let first = build_configuration(&input, &provenance());
    let second = build_configuration(&input, &provenance());
    assert_eq!(first, second);
    assert_eq!(first.buckets, vec!["a", "b"]);
    assert_eq!(first.active, vec!["b"]);
    assert_eq!(first.metadata["a"].source, "legacy_import_2");
    assert_eq!(first.metadata["a"].working_dir, PathBuf::from("/a"));
  }

  #[test]
  fn activation_keeps_the_invariant() {
    let input: BTreeMap<String, BucketSpec> = BTreeMap::from([("a".into(), spec("/a", false))]);
    let mut config = build_configuration(&input, &provenance());

    assert!(config.activate("a").unwrap());
    assert!(!config.activate("a").unwrap());
    assert!(matches!(config.activate("zzz"), Err(Error::InvalidConfig(_))));
    assert!(config.deactivate("a"));
    assert!(!config.deactivate("a"));
    assert!(config.active.is_empty());
  }

  #[test]
  fn validate_rejects_stray_active_names() {
    let config = BucketConfig { active: vec!["ghost".into()], ..Default::default() };
    assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
  }

  #[test]
  fn apply_stats_fills_counts() {
    let input: BTreeMap<String, BucketSpec> = BTreeMap::from([("a".into(), spec("/a", true))]);
    let mut config = build_configuration(&input, &provenance());
    let stats: StatsReport = [
      BucketStats { name: "a".into(), documents: 3, entities: 10, relationships: 4, chunks: 7 },
      BucketStats { name: "unlisted".into(), ..Default::default() },
    ]
    .into_iter()
    .collect();

    config.apply_stats(&stats);
    let meta = &config.metadata["a"];
    assert_eq!((meta.document_count, meta.entity_count, meta.relationship_count), (3, 10, 4));
    assert!(!config.metadata.contains_key("unlisted"));
  }

  #[test]
  fn json_uses_the_documented_field_names() {
    let input: BTreeMap<String, BucketSpec> = BTreeMap::from([("a".into(), spec("/a", true))]);
    let value = serde_json::to_value(build_configuration(&input, &provenance())).unwrap();
    let meta = &value["metadata"]["a"];
    for field in [
      "name",
      "description",
      "created_at",
      "document_count",
      "entity_count",
      "relationship_count",
      "last_updated",
      "source",
      "working_dir",
    ] {
      assert!(meta.get(field).is_some(), "missing {field}");
    }
    assert_eq!(value["active"], serde_json::json!(["a"]));
  }
}
