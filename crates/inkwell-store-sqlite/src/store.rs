//! [`ProjectStore`]: the directory of projects, one SQLite file each.

use std::{
  fs,
  path::{Path, PathBuf},
};

use chrono::Utc;
use inkwell_core::{
  ident::{SanitizedName, is_valid_project_name, sanitize_project_name},
  schema::{DEFAULT_PROJECT_TYPE, project_plan},
};
use rusqlite::Connection;

use crate::{Error, Project, Result, schema};

/// File extension of a project's store file.
pub const STORE_EXTENSION: &str = "sqlite";

// ─── Store ───────────────────────────────────────────────────────────────────

/// Owns `<root>/<name>/<name>.sqlite` for every project under `root`.
///
/// No locking is done: a project is assumed to have a single writer.
#[derive(Debug, Clone)]
pub struct ProjectStore {
  root: PathBuf,
}

/// Outcome of [`ProjectStore::create`].
#[derive(Debug, Clone)]
pub struct CreatedProject {
  /// The name the project was stored under, and whether it was sanitised.
  pub name: SanitizedName,
  pub path: PathBuf,
}

impl ProjectStore {
  pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

  pub fn root(&self) -> &Path { &self.root }

  pub fn project_dir(&self, name: &str) -> PathBuf { self.root.join(name) }

  pub fn store_path(&self, name: &str) -> PathBuf {
    self
      .project_dir(name)
      .join(format!("{name}.{STORE_EXTENSION}"))
  }

  /// Create a project of the default type.
  pub fn create(&self, raw_name: &str) -> Result<CreatedProject> {
    self.create_with_type(raw_name, DEFAULT_PROJECT_TYPE)
  }

  /// Create a new project directory and store file.
  ///
  /// Disallowed characters in `raw_name` are replaced with `_`; the returned
  /// [`CreatedProject::name`] reports whether that happened. Fails with
  /// [`Error::AlreadyExists`] if the (sanitised) name is taken.
  pub fn create_with_type(&self, raw_name: &str, project_type: &str) -> Result<CreatedProject> {
    let name = sanitize_project_name(raw_name)?;
    if name.substituted {
      tracing::info!(requested = raw_name, name = %name.name, "project name sanitised");
    }

    let dir = self.project_dir(&name.name);
    if dir.exists() {
      return Err(Error::AlreadyExists(name.name));
    }

    fs::create_dir_all(&self.root).map_err(|e| Error::io(&self.root, e))?;
    fs::create_dir(&dir).map_err(|e| match e.kind() {
      std::io::ErrorKind::AlreadyExists => Error::AlreadyExists(name.name.clone()),
      _ => Error::io(&dir, e),
    })?;

    let path = self.store_path(&name.name);
    let plan = project_plan(&name.name, project_type, Utc::now());

    let created = Connection::open(&path)
      .map_err(Error::from)
      .and_then(|conn| schema::apply_plan(&conn, &plan));

    if let Err(e) = created {
      tracing::warn!(project = %name.name, error = %e, "project creation failed; removing directory");
      if let Err(cleanup) = fs::remove_dir_all(&dir) {
        tracing::warn!(path = %dir.display(), error = %cleanup, "could not remove directory");
      }
      return Err(e);
    }

    tracing::info!(project = %name.name, path = %path.display(), "project created");
    Ok(CreatedProject { name, path })
  }

  /// Names of every project whose directory holds a store file.
  ///
  /// The iterator reads the directory lazily; call `list` again to start
  /// over. A missing root lists nothing.
  pub fn list(&self) -> Result<ProjectNames> {
    let entries = match fs::read_dir(&self.root) {
      Ok(entries) => Some(entries),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
      Err(e) => return Err(Error::io(&self.root, e)),
    };
    Ok(ProjectNames { store: self.clone(), entries })
  }

  /// Open an existing project for editing.
  pub fn open(&self, name: &str) -> Result<Project> {
    if !is_valid_project_name(name) {
      return Err(Error::ProjectNotFound(name.to_owned()));
    }
    let path = self.store_path(name);
    if !path.is_file() {
      return Err(Error::ProjectNotFound(name.to_owned()));
    }
    Project::open_at(name, path)
  }

  /// Add any missing base tables to every project under the root.
  ///
  /// Existing tables and rows are never touched. Safe to run repeatedly.
  /// A project that fails is recorded in the report and the rest carry on.
  pub fn initialize_all(&self) -> Result<InitReport> {
    let mut report = InitReport::default();

    for name in self.list()? {
      let path = self.store_path(&name);
      let outcome = Connection::open(&path)
        .map_err(Error::from)
        .and_then(|conn| schema::ensure_base_tables(&conn));

      match outcome {
        Ok(created) if created.is_empty() => report.up_to_date.push(name),
        Ok(created) => {
          tracing::info!(project = %name, tables = ?created, "added missing tables");
          report.touched.push(name);
        }
        Err(e) => {
          tracing::warn!(project = %name, error = %e, "could not initialise project");
          report.failed.push((name, e));
        }
      }
    }

    Ok(report)
  }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Lazy iterator over project names. See [`ProjectStore::list`].
pub struct ProjectNames {
  store:   ProjectStore,
  entries: Option<fs::ReadDir>,
}

impl Iterator for ProjectNames {
  type Item = String;

  fn next(&mut self) -> Option<String> {
    let entries = self.entries.as_mut()?;
    for entry in entries.by_ref() {
      let Ok(entry) = entry else { continue };
      let Ok(name) = entry.file_name().into_string() else { continue };
      if entry.path().is_dir() && self.store.store_path(&name).is_file() {
        return Some(name);
      }
    }
    None
  }
}

// ─── Batch report ────────────────────────────────────────────────────────────

/// Outcome of [`ProjectStore::initialize_all`].
#[derive(Debug, Default)]
pub struct InitReport {
  /// Projects that were missing at least one table.
  pub touched:    Vec<String>,
  pub up_to_date: Vec<String>,
  pub failed:     Vec<(String, Error)>,
}

impl InitReport {
  pub fn touched_count(&self) -> usize { self.touched.len() }
}
