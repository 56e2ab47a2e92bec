//! Layered configuration: TOML file, then `INKWELL_*` environment variables,
//! then command-line flags.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use anyhow::Context as _;
use inkwell_buckets::{BucketSpec, registry::DEFAULT_CONFIG_FILE};
use serde::Deserialize;

/// How bucket aliases are created in the working area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AliasMode {
  #[default]
  Symlink,
  Redirect,
}

/// Shape of `inkwell.toml`.
///
/// ```toml
/// projects_root = "~/writing/projects"
/// working_area  = "~/writing/working_dir"
/// source_label  = "legacy_import_2"
///
/// [buckets.scripts]
/// source      = "~/writing/buckets/scripts"
/// description = "Romantic comedy screenplays"
/// active      = true
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_projects_root")]
  pub projects_root: PathBuf,
  #[serde(default = "default_working_area")]
  pub working_area:  PathBuf,
  #[serde(default = "default_config_file")]
  pub config_file:   String,
  #[serde(default = "default_source_label")]
  pub source_label:  String,
  #[serde(default)]
  pub aliases:       AliasMode,
  #[serde(default)]
  pub buckets:       BTreeMap<String, BucketSpec>,
}

fn default_projects_root() -> PathBuf { PathBuf::from("projects") }

fn default_working_area() -> PathBuf { PathBuf::from("working_dir") }

fn default_config_file() -> String { DEFAULT_CONFIG_FILE.to_owned() }

fn default_source_label() -> String { String::from("inkwell") }

/// Values given on the command line; these win over everything else.
#[derive(Debug, Default)]
pub struct Overrides {
  pub projects_root: Option<PathBuf>,
  pub working_area:  Option<PathBuf>,
}

impl Settings {
  /// Load `path` (if it exists) layered with the environment and `overrides`.
  pub fn load(path: &Path, overrides: Overrides) -> anyhow::Result<Self> {
    let as_string = |p: Option<PathBuf>| p.map(|p| p.to_string_lossy().into_owned());

    let settings = config::Config::builder()
      .add_source(config::File::from(path.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("INKWELL"))
      .set_override_option("projects_root", as_string(overrides.projects_root))?
      .set_override_option("working_area", as_string(overrides.working_area))?
      .build()
      .with_context(|| format!("failed to read config file {}", path.display()))?;

    let mut settings: Self = settings
      .try_deserialize()
      .context("failed to deserialise settings")?;
    settings.expand_paths();
    Ok(settings)
  }

  fn expand_paths(&mut self) {
    self.projects_root = expand_tilde(&self.projects_root);
    self.working_area = expand_tilde(&self.working_area);
    for spec in self.buckets.values_mut() {
      spec.source = expand_tilde(&spec.source);
    }
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_without_a_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let settings = Settings::load(&dir.path().join("absent.toml"), Overrides::default()).unwrap();
    assert_eq!(settings.config_file, "bucket_config.json");
    assert_eq!(settings.aliases, AliasMode::Symlink);
    assert!(settings.buckets.is_empty());
  }

  #[test]
  fn file_then_flags() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("inkwell.toml");
    std::fs::write(
      &path,
      r#"
projects_root = "/srv/projects"
working_area  = "/srv/area"
aliases       = "redirect"

[buckets.scripts]
source      = "/srv/buckets/scripts"
description = "screenplays"

[buckets.plays]
source = "/srv/buckets/plays"
active = false
"#,
    )
    .unwrap();

    let settings = Settings::load(&path, Overrides {
      working_area: Some(PathBuf::from("/tmp/override")),
      ..Default::default()
    })
    .unwrap();

    assert_eq!(settings.projects_root, PathBuf::from("/srv/projects"));
    assert_eq!(settings.working_area, PathBuf::from("/tmp/override"));
    assert_eq!(settings.aliases, AliasMode::Redirect);
    assert_eq!(settings.buckets.len(), 2);
    assert!(settings.buckets["scripts"].active);
    assert!(!settings.buckets["plays"].active);
    assert_eq!(settings.buckets["plays"].description, "");
  }

  #[test]
  fn tilde_is_expanded_only_at_the_start() {
    assert_eq!(expand_tilde(Path::new("/a/~/b")), PathBuf::from("/a/~/b"));
    if let Ok(home) = std::env::var("HOME") {
      assert_eq!(expand_tilde(Path::new("~/x")), PathBuf::from(home).join("x"));
    }
  }
}
