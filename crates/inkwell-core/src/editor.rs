//! The `TableEditor` trait and the row types it trades in.
//!
//! The editor is schema-agnostic: it works over any table the backing store's
//! [`TableRegistry`](crate::registry::TableRegistry) knows about, with every
//! value expressed as text.

use serde::Serialize;

// ─── Row types ───────────────────────────────────────────────────────────────

/// One row of a listing. `values` line up with [`Rows::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
  pub row_id: i64,
  pub values: Vec<Option<String>>,
}

impl Row {
  /// The value of `column`, looked up through the listing's column order.
  pub fn get<'a>(&'a self, columns: &[String], column: &str) -> Option<&'a str> {
    let idx = columns.iter().position(|c| c == column)?;
    self.values.get(idx)?.as_deref()
  }
}

/// Every row of a table, in row-id order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rows {
  pub table:   String,
  pub columns: Vec<String>,
  pub rows:    Vec<Row>,
}

impl Rows {
  pub fn len(&self) -> usize { self.rows.len() }

  pub fn is_empty(&self) -> bool { self.rows.is_empty() }

  pub fn find(&self, row_id: i64) -> Option<&Row> { self.rows.iter().find(|r| r.row_id == row_id) }
}

/// A table flattened to CSV shape: a header and text records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CsvTable {
  pub header:  Vec<String>,
  pub records: Vec<Vec<String>>,
}

impl From<Rows> for CsvTable {
  fn from(rows: Rows) -> Self {
    Self {
      header:  rows.columns,
      records: rows
        .rows
        .into_iter()
        .map(|r| r.values.into_iter().map(Option::unwrap_or_default).collect())
        .collect(),
    }
  }
}

/// Outcome of [`TableEditor::import_csv`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  pub table:         String,
  /// `true` if the import created the table.
  pub created:       bool,
  pub rows_inserted: usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Schema-agnostic CRUD over the tables of one open project store.
///
/// Every mutation is committed on its own; there is no transaction spanning
/// calls. Values are untyped text and are never coerced or validated beyond
/// the table's structure.
pub trait TableEditor {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Names of the user tables in the store, sorted.
  fn list_tables(&self) -> Result<Vec<String>, Self::Error>;

  /// All rows of `table` with the row id and every listed column.
  fn list_rows(&self, table: &str) -> Result<Rows, Self::Error>;

  /// Apply a partial update to one row.
  ///
  /// Columns left out of `changes`, or given a blank value, keep their current
  /// value. Returns the number of columns written.
  fn update_row(
    &mut self,
    table: &str,
    row_id: i64,
    changes: &[(String, String)],
  ) -> Result<usize, Self::Error>;

  /// Insert a row with exactly one value per writable column, in column
  /// order. Returns the new row id.
  fn insert_row(&mut self, table: &str, values: &[String]) -> Result<i64, Self::Error>;

  /// Delete one row. Deleting a row that does not exist succeeds with `0`.
  fn delete_row(&mut self, table: &str, row_id: i64) -> Result<usize, Self::Error>;

  /// Append CSV data to `table`, creating it with one text column per header
  /// entry if it does not exist yet.
  fn import_csv(
    &mut self,
    table: &str,
    header: &[String],
    rows: &[Vec<String>],
  ) -> Result<ImportReport, Self::Error>;

  /// The listed columns and rows of `table` as CSV-shaped text.
  fn export_csv(&self, table: &str) -> Result<CsvTable, Self::Error> {
    Ok(self.list_rows(table)?.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rows_flatten_to_csv() {
    let rows = Rows {
      table:   "t1".into(),
      columns: vec!["a".into(), "b".into()],
      rows:    vec![
        Row { row_id: 1, values: vec![Some("1".into()), None] },
        Row { row_id: 2, values: vec![Some("x".into()), Some("y".into())] },
      ],
    };

    assert_eq!(rows.rows[0].get(&rows.columns, "a"), Some("1"));
    assert_eq!(rows.rows[0].get(&rows.columns, "b"), None);
    assert_eq!(rows.find(2).unwrap().values[1].as_deref(), Some("y"));

    let csv = CsvTable::from(rows);
    assert_eq!(csv.header, ["a", "b"]);
    assert_eq!(csv.records, vec![vec!["1", ""], vec!["x", "y"]]);
  }
}
