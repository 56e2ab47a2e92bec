//! The table registry: which tables a store holds and what their columns are.
//!
//! The editor consults the registry before every call instead of asking the
//! database for a table's shape each time. Entries come from three places:
//! the declared schemas, CSV imports, and a single introspection pass when a
//! store is opened (for tables nobody declared, such as legacy
//! `finalized_draft_v3`).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
  Error, Result,
  schema::{self, ColumnRole, TableSchema},
};

/// Where a registry entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrigin {
  /// One of the tables in [`schema::TABLES`].
  Declared,
  /// Created by a CSV import; every column is free text.
  Imported,
  /// Present in the file but not declared.
  Discovered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
  pub name: String,
  pub role: ColumnRole,
}

/// A column as reported by the database, before roles are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntrospectedColumn {
  pub name:        String,
  pub decl_type:   String,
  pub primary_key: bool,
  pub default:     Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
  pub name:        String,
  pub columns:     Vec<ColumnInfo>,
  pub origin:      TableOrigin,
  pub append_only: bool,
}

impl TableInfo {
  pub fn declared(schema: &TableSchema) -> Self {
    Self {
      name:        schema.name.to_owned(),
      columns:     schema
        .columns
        .iter()
        .map(|c| ColumnInfo { name: c.name.to_owned(), role: c.role })
        .collect(),
      origin:      TableOrigin::Declared,
      append_only: schema.append_only,
    }
  }

  pub fn imported<S: AsRef<str>>(name: &str, header: &[S]) -> Self {
    Self {
      name:        name.to_owned(),
      columns:     header
        .iter()
        .map(|h| ColumnInfo { name: h.as_ref().to_owned(), role: ColumnRole::Data })
        .collect(),
      origin:      TableOrigin::Imported,
      append_only: false,
    }
  }

  /// Build an entry from what the database reports about an existing table.
  ///
  /// Declared tables keep their declared roles for every column the file
  /// actually has; anything else is classified from its definition.
  pub fn from_introspection(name: &str, columns: Vec<IntrospectedColumn>) -> Self {
    let declared = schema::table(name);

    let columns = columns
      .into_iter()
      .map(|col| {
        let role = declared
          .and_then(|s| s.column(&col.name))
          .map(|c| c.role)
          .unwrap_or_else(|| classify(&col));
        ColumnInfo { name: col.name, role }
      })
      .collect();

    Self {
      name: name.to_owned(),
      columns,
      origin: if declared.is_some() { TableOrigin::Declared } else { TableOrigin::Discovered },
      append_only: declared.is_some_and(|s| s.append_only),
    }
  }

  /// Column names compare without regard to ASCII case, as in SQLite.
  pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
    self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
  }

  /// Columns the editor reads and writes values for.
  pub fn writable_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
    self.columns.iter().filter(|c| c.role.is_writable())
  }

  /// Columns returned by a row listing: everything except the row-id alias.
  pub fn listed_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
    self.columns.iter().filter(|c| c.role != ColumnRole::RowId)
  }

  pub fn updated_at_columns(&self) -> impl Iterator<Item = &ColumnInfo> {
    self.columns.iter().filter(|c| c.role == ColumnRole::UpdatedAt)
  }
}

fn classify(col: &IntrospectedColumn) -> ColumnRole {
  let stamped = col
    .default
    .as_deref()
    .is_some_and(|d| d.eq_ignore_ascii_case("CURRENT_TIMESTAMP"));

  if col.primary_key && col.decl_type.eq_ignore_ascii_case("INTEGER") {
    ColumnRole::RowId
  } else if stamped && col.name == "updated_at" {
    ColumnRole::UpdatedAt
  } else if stamped {
    ColumnRole::CreatedAt
  } else {
    ColumnRole::Data
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Table name → known shape, for one open store.
///
/// Lookups ignore ASCII case, matching how SQLite resolves table names. The
/// name as stored in the file is kept in [`TableInfo::name`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableRegistry {
  tables: BTreeMap<String, TableInfo>,
}

fn key(name: &str) -> String { name.to_ascii_lowercase() }

impl TableRegistry {
  pub fn new() -> Self { Self::default() }

  /// Add or replace an entry.
  pub fn insert(&mut self, info: TableInfo) { self.tables.insert(key(&info.name), info); }

  pub fn contains(&self, name: &str) -> bool { self.tables.contains_key(&key(name)) }

  /// Look up a table, failing with [`Error::UnknownTable`].
  pub fn get(&self, name: &str) -> Result<&TableInfo> {
    self
      .tables
      .get(&key(name))
      .ok_or_else(|| Error::UnknownTable(name.to_owned()))
  }

  /// Table names as stored, in sorted order.
  pub fn names(&self) -> Vec<String> { self.tables.values().map(|t| t.name.clone()).collect() }

  pub fn len(&self) -> usize { self.tables.len() }

  pub fn is_empty(&self) -> bool { self.tables.is_empty() }
}
