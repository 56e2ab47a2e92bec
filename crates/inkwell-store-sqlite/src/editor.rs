//! [`TableEditor`] for [`Project`].
//!
//! Table and column shapes come from the project's registry, never from the
//! caller; identifiers reach SQL only after they have been found there (or
//! validated, for tables created by an import), and always in the spelling
//! the registry holds.

use inkwell_core::{
  editor::{ImportReport, Row, Rows, TableEditor},
  ident::{quote_ident, validate_column_names, validate_table_name},
  registry::TableInfo,
};
use rusqlite::{OptionalExtension as _, params, params_from_iter};

use crate::{
  Error, Project, Result,
  encode::{column_list, create_text_table, placeholders, value_to_text},
};

fn is_blank(value: &str) -> bool { value.trim().is_empty() }

impl Project {
  fn table_info(&self, table: &str) -> Result<&TableInfo> {
    self.registry.get(table).map_err(Error::from_core)
  }

  /// The stored table name and its writable columns.
  fn insert_target(&self, table: &str) -> Result<(String, Vec<String>)> {
    let info = self.table_info(table)?;
    Ok((info.name.clone(), info.writable_columns().map(|c| c.name.clone()).collect()))
  }

  fn row_exists(&self, table: &str, row_id: i64) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE rowid = ?1", quote_ident(table));
    Ok(
      self
        .conn
        .query_row(&sql, params![row_id], |_| Ok(()))
        .optional()?
        .is_some(),
    )
  }

  /// Insert `values` positionally into `columns`, which the caller has
  /// already checked against the registry.
  fn insert_values(
    &self,
    table: &str,
    columns: &[String],
    values: &[String],
    row: Option<usize>,
  ) -> Result<i64> {
    if values.len() != columns.len() {
      return Err(Error::RowShapeMismatch {
        table: table.to_owned(),
        expected: columns.len(),
        actual: values.len(),
        row,
      });
    }

    let sql = if columns.is_empty() {
      format!("INSERT INTO {} DEFAULT VALUES", quote_ident(table))
    } else {
      format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table),
        column_list(columns),
        placeholders(columns.len())
      )
    };

    self
      .conn
      .execute(&sql, params_from_iter(values))
      .map_err(|e| Error::from_sqlite(table, e))?;
    Ok(self.conn.last_insert_rowid())
  }

  /// Look up a table that may be changed in place.
  fn mutable_info(&self, table: &str) -> Result<&TableInfo> {
    let info = self.table_info(table)?;
    if info.append_only {
      return Err(Error::AppendOnly(info.name.clone()));
    }
    Ok(info)
  }
}

impl TableEditor for Project {
  type Error = Error;

  fn list_tables(&self) -> Result<Vec<String>> { Ok(self.registry.names()) }

  fn list_rows(&self, table: &str) -> Result<Rows> {
    let info = self.table_info(table)?;
    let table = info.name.as_str();
    let columns: Vec<String> = info.listed_columns().map(|c| c.name.clone()).collect();

    let select = if columns.is_empty() {
      String::from("rowid")
    } else {
      format!("rowid, {}", column_list(&columns))
    };
    let sql = format!("SELECT {select} FROM {} ORDER BY rowid", quote_ident(table));

    let width = columns.len();
    let mut stmt = self.conn.prepare(&sql)?;
    let rows = stmt
      .query_map([], |row| {
        let values = (1..=width)
          .map(|i| row.get_ref(i).map(value_to_text))
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(Row { row_id: row.get(0)?, values })
      })?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Rows { table: table.to_owned(), columns, rows })
  }

  fn update_row(
    &mut self,
    table: &str,
    row_id: i64,
    changes: &[(String, String)],
  ) -> Result<usize> {
    let info = self.mutable_info(table)?;
    let table = info.name.as_str();

    let mut kept: Vec<(&str, &String)> = Vec::new();
    for (column, value) in changes {
      let Some(col) = info.column(column).filter(|c| c.role.is_writable()) else {
        return Err(Error::UnknownColumn { table: table.to_owned(), column: column.clone() });
      };
      if !is_blank(value) {
        kept.push((col.name.as_str(), value));
      }
    }

    if kept.is_empty() {
      return if self.row_exists(table, row_id)? {
        Ok(0)
      } else {
        Err(Error::RowNotFound { table: table.to_owned(), row_id })
      };
    }

    let mut assignments: Vec<String> = kept
      .iter()
      .enumerate()
      .map(|(i, (col, _))| format!("{} = ?{}", quote_ident(col), i + 1))
      .collect();
    assignments.extend(
      info
        .updated_at_columns()
        .map(|c| format!("{} = CURRENT_TIMESTAMP", quote_ident(&c.name))),
    );

    let sql = format!(
      "UPDATE {} SET {} WHERE rowid = ?{}",
      quote_ident(table),
      assignments.join(", "),
      kept.len() + 1
    );

    let mut bound: Vec<&dyn rusqlite::ToSql> =
      kept.iter().map(|(_, v)| *v as &dyn rusqlite::ToSql).collect();
    bound.push(&row_id);

    let affected = self
      .conn
      .execute(&sql, bound.as_slice())
      .map_err(|e| Error::from_sqlite(table, e))?;

    if affected == 0 {
      return Err(Error::RowNotFound { table: table.to_owned(), row_id });
    }

    tracing::debug!(table, row_id, columns = kept.len(), "row updated");
    Ok(kept.len())
  }

  fn insert_row(&mut self, table: &str, values: &[String]) -> Result<i64> {
    let (table, columns) = self.insert_target(table)?;
    let row_id = self.insert_values(&table, &columns, values, None)?;
    tracing::debug!(%table, row_id, "row inserted");
    Ok(row_id)
  }

  fn delete_row(&mut self, table: &str, row_id: i64) -> Result<usize> {
    let table = self.mutable_info(table)?.name.as_str();
    let sql = format!("DELETE FROM {} WHERE rowid = ?1", quote_ident(table));
    let affected = self
      .conn
      .execute(&sql, params![row_id])
      .map_err(|e| Error::from_sqlite(table, e))?;
    tracing::debug!(table, row_id, affected, "row delete");
    Ok(affected)
  }

  fn import_csv(
    &mut self,
    table: &str,
    header: &[String],
    rows: &[Vec<String>],
  ) -> Result<ImportReport> {
    let created = !self.registry.contains(table);

    if created {
      validate_table_name(table).map_err(Error::from_core)?;
      validate_column_names(header).map_err(Error::from_core)?;
      self.conn.execute_batch(&create_text_table(table, header))?;
      self.registry.insert(TableInfo::imported(table, header));
      tracing::info!(project = %self.name(), table, columns = header.len(), "created table from csv");
    }

    let (table, columns) = self.insert_target(table)?;
    let table = table.as_str();
    if !created && header.len() != columns.len() {
      tracing::debug!(
        table,
        header = header.len(),
        columns = columns.len(),
        "csv header width differs from table; appending positionally"
      );
    }

    let mut rows_inserted = 0;
    for (i, values) in rows.iter().enumerate() {
      self.insert_values(table, &columns, values, Some(i + 1))?;
      rows_inserted += 1;
    }

    tracing::info!(table, rows_inserted, "csv import finished");

    Ok(ImportReport { table: table.to_owned(), created, rows_inserted })
  }
}
