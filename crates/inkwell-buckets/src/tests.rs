//! Discovery, statistics, persistence and linking over real directories.

use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
};

use chrono::{TimeZone as _, Utc};
use serde_json::json;
use strum::IntoEnumIterator as _;
use tempfile::TempDir;

use crate::{
  AliasFs as _, ArtifactKind, BucketConfig, BucketRegistry, BucketSpec, BucketStatus, Error, Provenance,
  RedirectAliases, build_configuration, compute_stats, discover, persist,
};

fn provenance() -> Provenance {
  Provenance {
    source:      "test_fixture".into(),
    recorded_at: Utc.with_ymd_and_hms(2025, 1, 9, 0, 0, 0).unwrap(),
  }
}

fn write_json(path: &Path, value: serde_json::Value) {
  fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
}

/// A bucket directory with `n` entries in every artifact.
fn make_bucket(dir: &Path, n: usize) {
  fs::create_dir_all(dir).unwrap();
  let docs: serde_json::Map<_, _> = (0..n).map(|i| (format!("doc-{i}"), json!({"content": "x"}))).collect();
  write_json(&dir.join(ArtifactKind::Documents.file_name()), json!(docs));
  for kind in [ArtifactKind::Entities, ArtifactKind::Relationships, ArtifactKind::Chunks] {
    let data: Vec<_> = (0..n).map(|i| json!({ "__id__": i })).collect();
    write_json(&dir.join(kind.file_name()), json!({ "embedding_dim": 3, "data": data }));
  }
}

fn spec(source: PathBuf) -> BucketSpec {
  BucketSpec { source, description: String::from("fixture"), active: true }
}

// ─── Discovery ───────────────────────────────────────────────────────────────

#[test]
fn discover_reports_each_kind_of_bucket() {
  let tmp = TempDir::new().unwrap();
  let complete = tmp.path().join("complete");
  make_bucket(&complete, 2);
  let partial = tmp.path().join("partial");
  make_bucket(&partial, 1);
  fs::remove_file(partial.join("vdb_chunks.json")).unwrap();

  let roots = BTreeMap::from([
    (String::from("complete"), complete),
    (String::from("partial"), partial),
    (String::from("gone"), tmp.path().join("gone")),
  ]);
  let reports = discover(&["complete", "partial", "gone", "unconfigured"], &roots);

  assert_eq!(reports.len(), 4);
  match &reports[0].status {
    BucketStatus::Complete { sizes } => {
      assert_eq!(sizes.len(), 4);
      assert!(sizes.iter().all(|s| s.bytes > 0));
      assert!(sizes[0].display_size().ends_with("MB"));
    }
    other => panic!("expected complete, got {other:?}"),
  }
  assert_eq!(reports[1].status, BucketStatus::MissingFiles { missing: vec![ArtifactKind::Chunks] });
  assert_eq!(reports[2].status, BucketStatus::MissingDirectory);
  assert_eq!(reports[3].status, BucketStatus::MissingDirectory);
  assert_eq!(reports[3].source, None);

  let err = reports[1].incompleteness().unwrap();
  assert!(err.to_string().contains("partial"));
  assert!(err.to_string().contains("vdb_chunks.json"));
  assert!(reports[0].incompleteness().is_none());
}

// ─── Statistics ──────────────────────────────────────────────────────────────

#[test]
fn stats_count_zero_for_missing_entities() {
  let tmp = TempDir::new().unwrap();
  make_bucket(&tmp.path().join("a"), 3);
  make_bucket(&tmp.path().join("b"), 5);
  fs::remove_file(tmp.path().join("b").join("vdb_entities.json")).unwrap();

  let report = compute_stats(tmp.path(), &["a", "b"]);

  let b = report.get("b").unwrap();
  assert_eq!(b.entities, 0);
  assert_eq!((b.relationships, b.chunks, b.documents), (5, 5, 5));

  assert_eq!(report.totals.entities, 3);
  assert_eq!(report.totals.relationships, 8);
  assert_eq!(report.totals.chunks, 8);
  assert_eq!(report.totals.documents, 8);
}

#[test]
fn stats_tolerate_bad_artifacts() {
  let tmp = TempDir::new().unwrap();
  let dir = tmp.path().join("odd");
  fs::create_dir_all(&dir).unwrap();
  fs::write(dir.join("vdb_entities.json"), "{ not json").unwrap();
  write_json(&dir.join("vdb_relationships.json"), json!({ "rows": [1, 2] }));
  write_json(&dir.join("vdb_chunks.json"), json!({ "data": { "c1": {}, "c2": {} } }));

  let report = compute_stats(tmp.path(), &["odd", "absent"]);
  let odd = report.get("odd").unwrap();
  assert_eq!((odd.entities, odd.relationships, odd.chunks, odd.documents), (0, 0, 2, 0));
  assert_eq!(report.get("absent").unwrap().chunks, 0);
  assert_eq!(report.totals.chunks, 2);
}

#[test]
fn stats_never_modify_artifacts() {
  let tmp = TempDir::new().unwrap();
  make_bucket(&tmp.path().join("a"), 2);
  let before: Vec<Vec<u8>> = ArtifactKind::iter()
    .map(|k| fs::read(tmp.path().join("a").join(k.file_name())).unwrap())
    .collect();

  let first = compute_stats(tmp.path(), &["a"]);
  let second = compute_stats(tmp.path(), &["a"]);
  assert_eq!(first, second);

  let after: Vec<Vec<u8>> = ArtifactKind::iter()
    .map(|k| fs::read(tmp.path().join("a").join(k.file_name())).unwrap())
    .collect();
  assert_eq!(before, after);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[test]
fn persist_replaces_and_loads_back() {
  let tmp = TempDir::new().unwrap();
  let path = tmp.path().join("area").join("bucket_config.json");

  let many = BTreeMap::from([
    (String::from("a"), spec("/a".into())),
    (String::from("b"), spec("/b".into())),
  ]);
  persist(&build_configuration(&many, &provenance()), &path).unwrap();

  let one = BTreeMap::from([(String::from("c"), spec("/c".into()))]);
  let config = build_configuration(&one, &provenance());
  persist(&config, &path).unwrap();

  let loaded = BucketConfig::load(&path).unwrap();
  assert_eq!(loaded, config);
  assert_eq!(loaded.buckets, vec!["c"]);

  let text = fs::read_to_string(&path).unwrap();
  assert!(text.starts_with("{\n  \"buckets\""));

  let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
  assert_eq!(leftovers, 1);
}

#[test]
fn persist_refuses_an_invalid_config() {
  let tmp = TempDir::new().unwrap();
  let path = tmp.path().join("bucket_config.json");
  let config = BucketConfig { active: vec!["ghost".into()], ..Default::default() };

  assert!(matches!(persist(&config, &path), Err(Error::InvalidConfig(_))));
  assert!(!path.exists());
}

#[test]
fn load_reports_bad_json_with_its_path() {
  let tmp = TempDir::new().unwrap();
  let path = tmp.path().join("bucket_config.json");
  fs::write(&path, "[]").unwrap();

  let err = BucketConfig::load(&path).unwrap_err();
  assert!(matches!(err, Error::Json { .. }));
  assert!(err.to_string().contains("bucket_config.json"));
}

// ─── Linking ─────────────────────────────────────────────────────────────────

#[test]
fn link_continues_past_a_missing_source() {
  let tmp = TempDir::new().unwrap();
  let sources = tmp.path().join("sources");
  make_bucket(&sources.join("first"), 1);
  make_bucket(&sources.join("third"), 1);
  let area = tmp.path().join("area");

  let buckets = BTreeMap::from([
    (String::from("first"), spec(sources.join("first"))),
    (String::from("second"), spec(sources.join("second"))),
    (String::from("third"), spec(sources.join("third"))),
  ]);

  let registry = BucketRegistry::new(&area, RedirectAliases);
  let report = registry.link_into_working_area(&buckets).unwrap();

  assert_eq!(report.linked, vec!["first", "third"]);
  assert_eq!(report.failed_names(), vec!["second"]);
  assert!(report.failed[0].to_string().contains("second"));

  assert_eq!(registry.aliases().resolve_alias(&area.join("first")).unwrap(), sources.join("first"));

  let again = registry.link_into_working_area(&buckets).unwrap();
  assert!(again.linked.is_empty());
  assert_eq!(again.already_present.len(), 2);
}

#[cfg(unix)]
#[test]
fn link_with_symlinks() {
  let tmp = TempDir::new().unwrap();
  let source = tmp.path().join("sources").join("books");
  make_bucket(&source, 2);
  let area = tmp.path().join("area");
  fs::create_dir_all(area.join("taken")).unwrap();

  let buckets = BTreeMap::from([
    (String::from("books"), spec(source.clone())),
    (String::from("taken"), spec(source.clone())),
  ]);
  let registry = BucketRegistry::new(&area, crate::SymlinkAliases);
  let report = registry.link_into_working_area(&buckets).unwrap();

  assert_eq!(report.linked, vec!["books"]);
  assert_eq!(report.already_present, vec!["taken"]);
  assert!(area.join("books").join("vdb_entities.json").is_file());
}

#[cfg(unix)]
#[test]
fn link_resolves_relative_sources() {
  // A directory under the current one, named by a relative path.
  let local = TempDir::new_in(".").unwrap();
  let cwd = std::env::current_dir().unwrap();
  let relative = local.path().strip_prefix(&cwd).unwrap_or(local.path()).join("books");
  assert!(relative.is_relative());
  make_bucket(&relative, 2);

  let tmp = TempDir::new().unwrap();
  let area = tmp.path().join("area");
  let buckets = BTreeMap::from([(String::from("books"), spec(relative.clone()))]);

  let registry = BucketRegistry::new(&area, crate::SymlinkAliases);
  let report = registry.link_into_working_area(&buckets).unwrap();

  assert_eq!(report.linked, vec!["books"]);
  let target = fs::read_link(area.join("books")).unwrap();
  assert!(target.is_absolute());
  assert!(area.join("books").join("vdb_entities.json").is_file());
  assert_eq!(registry.stats(&["books"]).totals.entities, 2);

  let sync = registry.sync(&buckets, &provenance()).unwrap();
  assert!(sync.config.metadata["books"].working_dir.is_absolute());
}

#[test]
fn stats_follow_redirect_aliases() {
  let tmp = TempDir::new().unwrap();
  make_bucket(&tmp.path().join("sources").join("books"), 3);
  let area = tmp.path().join("area");
  let source = tmp.path().join("sources").join("books");
  let buckets = BTreeMap::from([(String::from("books"), spec(source))]);

  let registry = BucketRegistry::new(&area, RedirectAliases);
  registry.link_into_working_area(&buckets).unwrap();

  let report = registry.stats(&["books", "unlinked"]);
  assert_eq!(report.get("books").unwrap().entities, 3);
  assert_eq!(report.get("unlinked").unwrap().entities, 0);
  assert_eq!(report.totals.chunks, 3);
}

// ─── Sync ────────────────────────────────────────────────────────────────────

#[test]
fn sync_deactivates_incomplete_buckets_and_writes_config() {
  let tmp = TempDir::new().unwrap();
  let sources = tmp.path().join("sources");
  make_bucket(&sources.join("scripts"), 4);
  make_bucket(&sources.join("plays"), 2);
  fs::remove_file(sources.join("plays").join("vdb_relationships.json")).unwrap();
  let area = tmp.path().join("area");

  let buckets = BTreeMap::from([
    (String::from("scripts"), spec(sources.join("scripts"))),
    (String::from("plays"), spec(sources.join("plays"))),
    (String::from("books"), spec(sources.join("books"))),
  ]);

  let registry = BucketRegistry::new(&area, RedirectAliases).with_config_file("buckets.json");
  let report = registry.sync(&buckets, &provenance()).unwrap();

  assert_eq!(report.config.active, vec!["scripts"]);
  assert_eq!(report.config.metadata.len(), 3);
  assert_eq!(report.incomplete.len(), 2);
  assert!(report.incomplete.iter().all(|e| matches!(e, Error::IncompleteBucket { .. })));

  let scripts = &report.config.metadata["scripts"];
  assert_eq!((scripts.document_count, scripts.entity_count, scripts.relationship_count), (4, 4, 4));
  assert_eq!(report.stats.totals.entities, 6);

  assert_eq!(report.config_path, area.join("buckets.json"));
  assert_eq!(registry.load().unwrap(), report.config);

  assert_eq!(report.links.failed_names(), vec!["books"]);
  assert_eq!(report.links.linked.len(), 2);
}
