//! [`Project`]: an open project store.
//!
//! The generic editor lives in [`crate::editor`]; this module holds the
//! connection, the table registry and the typed helpers for the declared
//! tables (metadata, drafts, brainstorming history).

use std::path::{Path, PathBuf};

use chrono::Utc;
use inkwell_core::{
  ident::quote_ident,
  project::{BrainstormEntry, DraftScene, DraftVersion, MetadataEntry},
  registry::TableRegistry,
  schema::{
    BRAINSTORMING_LOG, DEFAULT_PROJECT_TYPE, FINALIZED_DRAFT, PROJECT_METADATA, keys, project_plan,
  },
};
use rusqlite::{Connection, OptionalExtension as _, ToSql, params};

use crate::{
  Error, Result,
  encode::{column_list, placeholders},
  schema,
};

/// A handle on one project's store file.
///
/// Every write is committed immediately. Two handles on the same file do not
/// coordinate with each other.
pub struct Project {
  name:                String,
  path:                Option<PathBuf>,
  pub(crate) conn:     Connection,
  pub(crate) registry: TableRegistry,
}

impl Project {
  pub(crate) fn open_at(name: &str, path: PathBuf) -> Result<Self> {
    let conn = Connection::open(&path)?;
    let registry = schema::load_registry(&conn)?;
    tracing::debug!(project = name, tables = registry.len(), "project opened");
    Ok(Self { name: name.to_owned(), path: Some(path), conn, registry })
  }

  /// A fully initialised project held in memory, for tests.
  pub fn open_in_memory(name: &str) -> Result<Self> {
    let conn = Connection::open_in_memory()?;
    schema::apply_plan(&conn, &project_plan(name, DEFAULT_PROJECT_TYPE, Utc::now()))?;
    let registry = schema::load_registry(&conn)?;
    Ok(Self { name: name.to_owned(), path: None, conn, registry })
  }

  pub fn name(&self) -> &str { &self.name }

  /// Location of the store file; `None` for in-memory projects.
  pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

  pub fn registry(&self) -> &TableRegistry { &self.registry }

  /// Re-read the table registry from the file.
  pub fn reload_registry(&mut self) -> Result<()> {
    self.registry = schema::load_registry(&self.conn)?;
    Ok(())
  }

  fn require(&self, table: &str) -> Result<()> {
    self.registry.get(table).map(|_| ()).map_err(Error::from_core)
  }

  // ── Metadata ──────────────────────────────────────────────────────────────

  pub fn metadata(&self) -> Result<Vec<MetadataEntry>> {
    self.require(PROJECT_METADATA)?;
    let mut stmt = self
      .conn
      .prepare("SELECT key, value, updated_at FROM project_metadata ORDER BY id")?;
    let rows = stmt
      .query_map([], |row| {
        Ok(MetadataEntry {
          key:        row.get(0)?,
          value:      row.get(1)?,
          updated_at: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
    self.require(PROJECT_METADATA)?;
    let value: Option<Option<String>> = self
      .conn
      .query_row(
        "SELECT value FROM project_metadata WHERE key = ?1",
        params![key],
        |row| row.get(0),
      )
      .optional()?;
    Ok(value.flatten())
  }

  /// Insert or replace the value for `key`, refreshing `updated_at`.
  pub fn set_metadata(&mut self, key: &str, value: &str) -> Result<()> {
    self.require(PROJECT_METADATA)?;
    self
      .conn
      .execute(
        "INSERT INTO project_metadata (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE
           SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        params![key, value],
      )
      .map_err(|e| Error::from_sqlite(PROJECT_METADATA, e))?;
    Ok(())
  }

  // ── Drafts ────────────────────────────────────────────────────────────────

  /// The draft version new scenes are written to. Defaults to 1.
  pub fn current_version(&self) -> Result<DraftVersion> {
    match self.get_metadata(keys::CURRENT_VERSION)? {
      Some(v) => Ok(v.parse()?),
      None => Ok(DraftVersion::FIRST),
    }
  }

  /// Move to the next draft version and record it as current.
  pub fn start_new_version(&mut self) -> Result<DraftVersion> {
    let next = self.current_version()?.next();
    self.set_metadata(keys::CURRENT_VERSION, &next.get().to_string())?;
    tracing::info!(project = %self.name, version = %next, "started new draft version");
    Ok(next)
  }

  /// Write the final text for one scene of a version, replacing any earlier
  /// text for the same (version, act, scene).
  pub fn save_draft(
    &mut self,
    version: DraftVersion,
    act: i64,
    scene: i64,
    text: &str,
  ) -> Result<()> {
    self.require(FINALIZED_DRAFT)?;
    self
      .conn
      .execute(
        "INSERT INTO finalized_draft (version, act, scene, final_text)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(version, act, scene) DO UPDATE
           SET final_text = excluded.final_text",
        params![version.get(), act, scene, text],
      )
      .map_err(|e| Error::from_sqlite(FINALIZED_DRAFT, e))?;
    Ok(())
  }

  /// Every scene of `version`, ordered by act then scene.
  pub fn drafts(&self, version: DraftVersion) -> Result<Vec<DraftScene>> {
    self.require(FINALIZED_DRAFT)?;
    let mut stmt = self.conn.prepare(
      "SELECT act, scene, final_text FROM finalized_draft
       WHERE version = ?1 ORDER BY act, scene",
    )?;
    let rows = stmt
      .query_map(params![version.get()], |row| {
        Ok(DraftScene {
          version,
          act: row.get(0)?,
          scene: row.get(1)?,
          final_text: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(rows)
  }

  // ── Brainstorming ─────────────────────────────────────────────────────────

  /// Append one entry to the brainstorming log. Returns its row id.
  ///
  /// Fields whose column the file's log table lacks (older stores have no
  /// `tone_preset`) are not written.
  pub fn log_brainstorm(&mut self, entry: &BrainstormEntry) -> Result<i64> {
    let info = self.registry.get(BRAINSTORMING_LOG).map_err(Error::from_core)?;
    let fields: [(&str, &dyn ToSql); 6] = [
      ("act", &entry.act),
      ("scene", &entry.scene),
      ("scene_description", &entry.scene_description),
      ("bucket_name", &entry.bucket_name),
      ("tone_preset", &entry.tone_preset),
      ("response", &entry.response),
    ];
    let (columns, values): (Vec<&str>, Vec<&dyn ToSql>) =
      fields.into_iter().filter(|(c, _)| info.column(c).is_some()).unzip();

    let sql = format!(
      "INSERT INTO {} ({}) VALUES ({})",
      quote_ident(&info.name),
      column_list(&columns),
      placeholders(columns.len())
    );
    self
      .conn
      .execute(&sql, values.as_slice())
      .map_err(|e| Error::from_sqlite(BRAINSTORMING_LOG, e))?;
    Ok(self.conn.last_insert_rowid())
  }
}
