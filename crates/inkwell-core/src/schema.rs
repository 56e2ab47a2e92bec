//! Static schema definitions for every table a project owns.
//!
//! Nothing here touches a database. The store turns a [`TableSchema`] into
//! DDL with [`TableSchema::create_sql`] and seeds `project_metadata` from
//! [`ProjectPlan::seeds`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{AsRefStr, Display, EnumString};

use crate::ident::quote_ident;

// ─── Table names ─────────────────────────────────────────────────────────────

pub const CHARACTERS: &str = "characters";
pub const STORY_OUTLINE: &str = "story_outline";
pub const BRAINSTORMING_LOG: &str = "brainstorming_log";
pub const FINALIZED_DRAFT: &str = "finalized_draft";
pub const PROJECT_METADATA: &str = "project_metadata";

/// Well-known `project_metadata` keys.
pub mod keys {
  pub const PROJECT_NAME: &str = "project_name";
  pub const PROJECT_TYPE: &str = "project_type";
  pub const CREATED_DATE: &str = "created_date";
  pub const CURRENT_VERSION: &str = "current_version";
}

/// Project type recorded when the caller does not pick one.
pub const DEFAULT_PROJECT_TYPE: &str = "screenplay";

/// Value of `PRAGMA user_version` written into freshly created stores.
pub const SCHEMA_VERSION: i32 = 1;

// ─── Column model ────────────────────────────────────────────────────────────

/// Declared SQL type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum ColumnType {
  Integer,
  Text,
  Timestamp,
}

/// How the editor treats a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, Serialize)]
#[strum(serialize_all = "snake_case")]
pub enum ColumnRole {
  /// `INTEGER PRIMARY KEY`; an alias of SQLite's row id.
  RowId,
  /// Ordinary user data. The only role the editor writes to.
  Data,
  /// Stamped by the database on insert.
  CreatedAt,
  /// Stamped on insert and refreshed on every editor write.
  UpdatedAt,
}

impl ColumnRole {
  pub fn is_writable(self) -> bool { matches!(self, Self::Data) }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnDef {
  pub name:        &'static str,
  pub ty:          ColumnType,
  pub role:        ColumnRole,
  /// Extra constraint text appended after the type, e.g. `NOT NULL`.
  pub constraints: &'static str,
}

impl ColumnDef {
  const fn id() -> Self {
    Self {
      name:        "id",
      ty:          ColumnType::Integer,
      role:        ColumnRole::RowId,
      constraints: "PRIMARY KEY AUTOINCREMENT",
    }
  }

  const fn data(name: &'static str, ty: ColumnType, constraints: &'static str) -> Self {
    Self { name, ty, role: ColumnRole::Data, constraints }
  }

  const fn text(name: &'static str) -> Self { Self::data(name, ColumnType::Text, "") }

  const fn stamp(name: &'static str, role: ColumnRole) -> Self {
    Self {
      name,
      ty: ColumnType::Timestamp,
      role,
      constraints: "DEFAULT CURRENT_TIMESTAMP",
    }
  }

  fn ddl(&self) -> String {
    let mut out = format!("{} {}", quote_ident(self.name), self.ty);
    if !self.constraints.is_empty() {
      out.push(' ');
      out.push_str(self.constraints);
    }
    out
  }
}

// ─── Tables ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableSchema {
  pub name:        &'static str,
  pub purpose:     &'static str,
  pub columns:     &'static [ColumnDef],
  /// Column sets that must be unique together.
  pub unique:      &'static [&'static [&'static str]],
  /// Rows may be added but never edited or removed.
  pub append_only: bool,
}

impl TableSchema {
  pub fn column(&self, name: &str) -> Option<&ColumnDef> {
    self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
  }

  pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnDef> {
    self.columns.iter().filter(|c| c.role.is_writable())
  }

  /// `CREATE TABLE IF NOT EXISTS` statement for this table.
  pub fn create_sql(&self) -> String {
    let mut parts: Vec<String> = self.columns.iter().map(ColumnDef::ddl).collect();
    for set in self.unique {
      let cols: Vec<String> = set.iter().map(|c| quote_ident(c)).collect();
      parts.push(format!("UNIQUE ({})", cols.join(", ")));
    }
    format!(
      "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
      quote_ident(self.name),
      parts.join(",\n    ")
    )
  }
}

static CHARACTERS_COLUMNS: [ColumnDef; 9] = [
  ColumnDef::id(),
  ColumnDef::data("name", ColumnType::Text, "NOT NULL"),
  ColumnDef::text("gender"),
  ColumnDef::text("age"),
  ColumnDef::text("romantic_challenge"),
  ColumnDef::text("lovable_trait"),
  ColumnDef::text("comedic_flaw"),
  ColumnDef::text("notes"),
  ColumnDef::stamp("created_at", ColumnRole::CreatedAt),
];

static STORY_OUTLINE_COLUMNS: [ColumnDef; 6] = [
  ColumnDef::id(),
  ColumnDef::data("act", ColumnType::Integer, "NOT NULL"),
  ColumnDef::data("scene", ColumnType::Integer, "NOT NULL"),
  ColumnDef::text("key_characters"),
  ColumnDef::text("key_events"),
  ColumnDef::stamp("created_at", ColumnRole::CreatedAt),
];

static BRAINSTORMING_LOG_COLUMNS: [ColumnDef; 8] = [
  ColumnDef::id(),
  ColumnDef::data("act", ColumnType::Integer, ""),
  ColumnDef::data("scene", ColumnType::Integer, ""),
  ColumnDef::text("scene_description"),
  ColumnDef::text("bucket_name"),
  ColumnDef::text("tone_preset"),
  ColumnDef::text("response"),
  ColumnDef::stamp("created_at", ColumnRole::CreatedAt),
];

static FINALIZED_DRAFT_COLUMNS: [ColumnDef; 6] = [
  ColumnDef::id(),
  ColumnDef::data("version", ColumnType::Integer, "NOT NULL DEFAULT 1"),
  ColumnDef::data("act", ColumnType::Integer, "NOT NULL"),
  ColumnDef::data("scene", ColumnType::Integer, "NOT NULL"),
  ColumnDef::text("final_text"),
  ColumnDef::stamp("created_at", ColumnRole::CreatedAt),
];

static PROJECT_METADATA_COLUMNS: [ColumnDef; 5] = [
  ColumnDef::id(),
  ColumnDef::data("key", ColumnType::Text, "UNIQUE NOT NULL"),
  ColumnDef::text("value"),
  ColumnDef::stamp("created_at", ColumnRole::CreatedAt),
  ColumnDef::stamp("updated_at", ColumnRole::UpdatedAt),
];

/// Every declared table, in creation order.
pub static TABLES: [TableSchema; 5] = [
  TableSchema {
    name:        CHARACTERS,
    purpose:     "character sheets",
    columns:     &CHARACTERS_COLUMNS,
    unique:      &[],
    append_only: false,
  },
  TableSchema {
    name:        STORY_OUTLINE,
    purpose:     "act/scene breakdown",
    columns:     &STORY_OUTLINE_COLUMNS,
    unique:      &[],
    append_only: false,
  },
  TableSchema {
    name:        BRAINSTORMING_LOG,
    purpose:     "creative-ideation history",
    columns:     &BRAINSTORMING_LOG_COLUMNS,
    unique:      &[],
    append_only: true,
  },
  TableSchema {
    name:        FINALIZED_DRAFT,
    purpose:     "versioned final scene text",
    columns:     &FINALIZED_DRAFT_COLUMNS,
    unique:      &[&["version", "act", "scene"]],
    append_only: false,
  },
  TableSchema {
    name:        PROJECT_METADATA,
    purpose:     "key-value project settings",
    columns:     &PROJECT_METADATA_COLUMNS,
    unique:      &[],
    append_only: false,
  },
];

/// Look up a declared table by name.
pub fn table(name: &str) -> Option<&'static TableSchema> {
  TABLES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

/// The tables every project store must contain, whatever its age.
/// `project_metadata` is not among them.
pub fn base_tables() -> impl Iterator<Item = &'static TableSchema> {
  TABLES.iter().filter(|t| t.name != PROJECT_METADATA)
}

// ─── Project plan ────────────────────────────────────────────────────────────

/// One `project_metadata` row written at project creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataSeed {
  pub key:   &'static str,
  pub value: String,
}

/// Everything needed to instantiate a new project store.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectPlan {
  pub tables: &'static [TableSchema],
  pub seeds:  Vec<MetadataSeed>,
}

/// Build the creation plan for a project.
pub fn project_plan(
  project_name: &str,
  project_type: &str,
  created_at: DateTime<Utc>,
) -> ProjectPlan {
  let seed = |key, value: String| MetadataSeed { key, value };
  ProjectPlan {
    tables: &TABLES,
    seeds:  vec![
      seed(keys::PROJECT_NAME, project_name.to_owned()),
      seed(keys::PROJECT_TYPE, project_type.to_owned()),
      seed(keys::CREATED_DATE, created_at.to_rfc3339()),
      seed(keys::CURRENT_VERSION, "1".to_owned()),
    ],
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_table_has_a_row_id_first() {
    for t in &TABLES {
      assert_eq!(t.columns[0].role, ColumnRole::RowId, "{}", t.name);
    }
  }

  #[test]
  fn lookup_by_name() {
    let t = table(STORY_OUTLINE).unwrap();
    let names: Vec<_> = t.columns.iter().map(|c| c.name).collect();
    assert_eq!(names, ["id", "act", "scene", "key_characters", "key_events", "created_at"]);
    assert!(table("finalized_draft_v1").is_none());
  }

  #[test]
  fn base_tables_exclude_metadata() {
    let names: Vec<_> = base_tables().map(|t| t.name).collect();
    assert_eq!(names, [CHARACTERS, STORY_OUTLINE, BRAINSTORMING_LOG, FINALIZED_DRAFT]);
  }

  #[test]
  fn draft_table_ddl_has_composite_unique() {
    let sql = table(FINALIZED_DRAFT).unwrap().create_sql();
    assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS \"finalized_draft\""));
    assert!(sql.contains("UNIQUE (\"version\", \"act\", \"scene\")"));
    assert!(sql.contains("\"id\" INTEGER PRIMARY KEY AUTOINCREMENT"));
  }

  #[test]
  fn writable_columns_skip_generated_ones() {
    let t = table(PROJECT_METADATA).unwrap();
    let names: Vec<_> = t.writable_columns().map(|c| c.name).collect();
    assert_eq!(names, ["key", "value"]);
  }

  #[test]
  fn plan_seeds_metadata() {
    let now = Utc::now();
    let plan = project_plan("noir", DEFAULT_PROJECT_TYPE, now);
    assert_eq!(plan.tables.len(), 5);
    let seeded: Vec<_> = plan.seeds.iter().map(|s| s.key).collect();
    assert_eq!(
      seeded,
      [keys::PROJECT_NAME, keys::PROJECT_TYPE, keys::CREATED_DATE, keys::CURRENT_VERSION]
    );
    assert_eq!(plan.seeds[0].value, "noir");
    assert_eq!(plan.seeds[2].value, now.to_rfc3339());
    assert_eq!(plan.seeds[3].value, "1");
  }

  #[test]
  fn column_type_strings() {
    assert_eq!(ColumnType::Timestamp.to_string(), "TIMESTAMP");
    assert_eq!(ColumnRole::UpdatedAt.as_ref(), "updated_at");
  }
}
