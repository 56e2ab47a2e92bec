//! Applying declared schemas to a SQLite file, and reading back what a file
//! actually contains.

use inkwell_core::{
  ident::quote_ident,
  registry::{IntrospectedColumn, TableInfo, TableRegistry},
  schema::{self, ProjectPlan, SCHEMA_VERSION},
};
use rusqlite::{Connection, params};

use crate::Result;

/// Create every table in `plan` and write its seed rows.
///
/// Each statement is committed as it runs; a failure part-way leaves the
/// earlier tables in place.
pub(crate) fn apply_plan(conn: &Connection, plan: &ProjectPlan) -> Result<()> {
  for table in plan.tables {
    conn.execute_batch(&table.create_sql())?;
  }

  for seed in &plan.seeds {
    conn.execute(
      "INSERT INTO project_metadata (key, value) VALUES (?1, ?2)",
      params![seed.key, seed.value],
    )?;
  }

  conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
  Ok(())
}

/// Names of user tables, sorted. SQLite's internal tables are excluded.
pub(crate) fn user_tables(conn: &Connection) -> Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT name FROM sqlite_master
     WHERE type = 'table' AND name NOT LIKE 'sqlite\\_%' ESCAPE '\\'
     ORDER BY name",
  )?;
  let names = stmt
    .query_map([], |row| row.get(0))?
    .collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(names)
}

/// Create whichever base tables are missing. Returns the names created.
pub(crate) fn ensure_base_tables(conn: &Connection) -> Result<Vec<&'static str>> {
  let existing = user_tables(conn)?;
  let mut created = Vec::new();

  for table in schema::base_tables() {
    if existing.iter().any(|t| t.eq_ignore_ascii_case(table.name)) {
      continue;
    }
    conn.execute_batch(&table.create_sql())?;
    created.push(table.name);
  }

  Ok(created)
}

fn introspect(conn: &Connection, table: &str) -> Result<Vec<IntrospectedColumn>> {
  let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table)))?;
  let cols = stmt
    .query_map([], |row| {
      Ok(IntrospectedColumn {
        name:        row.get(1)?,
        decl_type:   row.get(2)?,
        primary_key: row.get::<_, i64>(5)? > 0,
        default:     row.get(4)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(cols)
}

/// Build a registry describing every user table in the file.
pub(crate) fn load_registry(conn: &Connection) -> Result<TableRegistry> {
  let mut registry = TableRegistry::new();
  for name in user_tables(conn)? {
    let columns = introspect(conn, &name)?;
    registry.insert(TableInfo::from_introspection(&name, columns));
  }
  Ok(registry)
}
