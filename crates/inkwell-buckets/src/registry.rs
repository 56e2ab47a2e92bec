//! [`BucketRegistry`]: the shared working area and everything written to it.

use std::{
  collections::BTreeMap,
  fs,
  path::{self, Path, PathBuf},
};

use crate::{
  Error, Result,
  alias::AliasFs,
  config::{BucketConfig, BucketSpec, Provenance, build_configuration, persist},
  discover::{BucketReport, discover},
  stats::{StatsReport, bucket_stats},
};

/// Default file name of the configuration inside the working area.
pub const DEFAULT_CONFIG_FILE: &str = "bucket_config.json";

// ─── Reports ─────────────────────────────────────────────────────────────────

/// Outcome of [`BucketRegistry::link_into_working_area`].
#[derive(Debug, Default)]
pub struct LinkReport {
  pub linked:          Vec<String>,
  /// Buckets whose name was already taken in the working area.
  pub already_present: Vec<String>,
  /// One [`Error::LinkFailure`] per bucket that could not be linked.
  pub failed:          Vec<Error>,
}

impl LinkReport {
  pub fn failed_names(&self) -> Vec<&str> {
    self
      .failed
      .iter()
      .filter_map(|e| match e {
        Error::LinkFailure { bucket, .. } => Some(bucket.as_str()),
        _ => None,
      })
      .collect()
  }
}

/// Outcome of [`BucketRegistry::sync`].
#[derive(Debug)]
pub struct SyncReport {
  pub discovery:   Vec<BucketReport>,
  /// One [`Error::IncompleteBucket`] per bucket left out of the active list.
  pub incomplete:  Vec<Error>,
  pub config:      BucketConfig,
  pub config_path: PathBuf,
  pub stats:       StatsReport,
  pub links:       LinkReport,
}

// ─── Registry ────────────────────────────────────────────────────────────────

fn absolute_sources(
  buckets: &BTreeMap<String, BucketSpec>,
) -> Result<BTreeMap<String, BucketSpec>> {
  buckets
    .iter()
    .map(|(name, spec)| {
      let source = path::absolute(&spec.source).map_err(|e| Error::io(&spec.source, e))?;
      Ok((name.clone(), BucketSpec { source, ..spec.clone() }))
    })
    .collect()
}

/// A working area plus the aliasing strategy used to populate it.
#[derive(Debug, Clone)]
pub struct BucketRegistry<A> {
  working_area: PathBuf,
  config_file:  String,
  aliases:      A,
}

impl<A: AliasFs> BucketRegistry<A> {
  pub fn new(working_area: impl Into<PathBuf>, aliases: A) -> Self {
    Self {
      working_area: working_area.into(),
      config_file: DEFAULT_CONFIG_FILE.to_owned(),
      aliases,
    }
  }

  pub fn with_config_file(mut self, file: impl Into<String>) -> Self {
    self.config_file = file.into();
    self
  }

  pub fn working_area(&self) -> &Path { &self.working_area }

  pub fn config_path(&self) -> PathBuf { self.working_area.join(&self.config_file) }

  pub fn aliases(&self) -> &A { &self.aliases }

  /// The configuration currently persisted in the working area.
  pub fn load(&self) -> Result<BucketConfig> { BucketConfig::load(&self.config_path()) }

  /// Where `<working_area>/<name>` leads: the alias target, or the entry
  /// itself when it is not an alias.
  pub fn resolve(&self, name: &str) -> PathBuf {
    let entry = self.working_area.join(name);
    self.aliases.resolve_alias(&entry).unwrap_or(entry)
  }

  /// Counts for every named bucket as reachable from the working area.
  pub fn stats<S: AsRef<str>>(&self, names: &[S]) -> StatsReport {
    names
      .iter()
      .map(|name| bucket_stats(name.as_ref(), &self.resolve(name.as_ref())))
      .collect()
  }

  /// Make each bucket reachable as `<working_area>/<name>`.
  ///
  /// A bucket whose source directory is missing, or whose alias cannot be
  /// created, is recorded as failed and the rest carry on. Names already
  /// present in the working area are left untouched. Relative sources are
  /// made absolute first, so every alias resolves from anywhere.
  pub fn link_into_working_area(&self, buckets: &BTreeMap<String, BucketSpec>) -> Result<LinkReport> {
    fs::create_dir_all(&self.working_area).map_err(|e| Error::io(&self.working_area, e))?;

    let mut report = LinkReport::default();
    for (name, spec) in buckets {
      let alias = self.working_area.join(name);

      if !spec.source.is_dir() {
        tracing::warn!(bucket = %name, source = %spec.source.display(), "bucket source not found");
        report.failed.push(Error::LinkFailure {
          bucket: name.clone(),
          reason: format!("source directory {} does not exist", spec.source.display()),
        });
        continue;
      }

      if self.aliases.alias_exists(&alias) {
        tracing::debug!(bucket = %name, "already present in working area");
        report.already_present.push(name.clone());
        continue;
      }

      let created = path::absolute(&spec.source)
        .and_then(|target| self.aliases.create_alias(&target, &alias).map(|()| target));
      match created {
        Ok(target) => {
          tracing::info!(bucket = %name, source = %target.display(), "bucket linked");
          report.linked.push(name.clone());
        }
        Err(e) => {
          tracing::warn!(bucket = %name, error = %e, "could not link bucket");
          report.failed.push(Error::LinkFailure { bucket: name.clone(), reason: e.to_string() });
        }
      }
    }

    Ok(report)
  }

  /// Rebuild the working area from `buckets`.
  ///
  /// Incomplete buckets stay in the configuration but are not active. Only a
  /// failure to write the configuration itself is returned as an error.
  /// Sources are recorded as absolute paths.
  pub fn sync(
    &self,
    buckets: &BTreeMap<String, BucketSpec>,
    provenance: &Provenance,
  ) -> Result<SyncReport> {
    let buckets = &absolute_sources(buckets)?;
    let names: Vec<&str> = buckets.keys().map(String::as_str).collect();
    let roots: BTreeMap<String, PathBuf> = buckets
      .iter()
      .map(|(name, spec)| (name.clone(), spec.source.clone()))
      .collect();

    let discovery = discover(&names, &roots);
    let incomplete: Vec<Error> = discovery.iter().filter_map(BucketReport::incompleteness).collect();

    let mut config = build_configuration(buckets, provenance);
    for report in discovery.iter().filter(|r| !r.is_complete()) {
      if config.deactivate(&report.name) {
        tracing::warn!(bucket = %report.name, "incomplete bucket deactivated");
      }
    }

    let stats: StatsReport = buckets
      .iter()
      .map(|(name, spec)| bucket_stats(name, &spec.source))
      .collect();
    config.apply_stats(&stats);

    let config_path = self.config_path();
    persist(&config, &config_path)?;

    let links = self.link_into_working_area(buckets)?;

    tracing::info!(
      path = %config_path.display(),
      active = ?config.active,
      linked = links.linked.len(),
      failed = links.failed.len(),
      "bucket sync finished"
    );

    Ok(SyncReport { discovery, incomplete, config, config_path, stats, links })
  }
}
