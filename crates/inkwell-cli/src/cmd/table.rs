//! `table` subcommands: the generic editor over any table of a project.

use std::{fs::File, io, path::PathBuf};

use anyhow::Context as _;
use clap::Subcommand;
use inkwell_core::editor::{Rows, TableEditor as _};

use super::open;
use crate::settings::Settings;

#[derive(Subcommand, Debug)]
pub enum TableCmd {
  /// List the tables of a project.
  List { project: String },
  /// Print every row of a table.
  Rows { project: String, table: String },
  /// Insert a row: one value per writable column, in column order.
  Insert {
    project: String,
    table:   String,
    #[arg(allow_hyphen_values = true)]
    values:  Vec<String>,
  },
  /// Change some columns of a row. Blank values keep the current value.
  Update {
    project: String,
    table:   String,
    row_id:  i64,
    #[arg(required = true, value_name = "COLUMN=VALUE", value_parser = parse_assignment)]
    changes: Vec<(String, String)>,
  },
  /// Delete a row. Deleting a missing row is not an error.
  Delete { project: String, table: String, row_id: i64 },
  /// Import a CSV file; the table is created if it does not exist.
  Import { project: String, table: String, file: PathBuf },
  /// Write a table as CSV to a file or stdout.
  Export {
    project: String,
    table:   String,
    #[arg(long, value_name = "FILE")]
    out:     Option<PathBuf>,
  },
}

/// `column=value`. The value may be empty or contain further `=` signs.
fn parse_assignment(s: &str) -> Result<(String, String), String> {
  match s.split_once('=') {
    Some((column, value)) if !column.is_empty() => Ok((column.to_owned(), value.to_owned())),
    _ => Err(format!("expected COLUMN=VALUE, got {s:?}")),
  }
}

fn print_rows(rows: &Rows) {
  println!("row_id\t{}", rows.columns.join("\t"));
  for row in &rows.rows {
    let values: Vec<&str> = row.values.iter().map(|v| v.as_deref().unwrap_or("NULL")).collect();
    println!("{}\t{}", row.row_id, values.join("\t"));
  }
}

pub fn run(settings: &Settings, cmd: TableCmd) -> anyhow::Result<()> {
  match cmd {
    TableCmd::List { project } => {
      for table in open(settings, &project)?.list_tables()? {
        println!("{table}");
      }
    }
    TableCmd::Rows { project, table } => {
      print_rows(&open(settings, &project)?.list_rows(&table)?);
    }
    TableCmd::Insert { project, table, values } => {
      let row_id = open(settings, &project)?.insert_row(&table, &values)?;
      println!("inserted row {row_id} into {table}");
    }
    TableCmd::Update { project, table, row_id, changes } => {
      let changed = open(settings, &project)?.update_row(&table, row_id, &changes)?;
      println!("updated {changed} column(s) of row {row_id} in {table}");
    }
    TableCmd::Delete { project, table, row_id } => {
      let deleted = open(settings, &project)?.delete_row(&table, row_id)?;
      println!("deleted {deleted} row(s) from {table}");
    }
    TableCmd::Import { project, table, file } => {
      let reader =
        File::open(&file).with_context(|| format!("failed to open {}", file.display()))?;
      let report = open(settings, &project)?
        .import_csv_reader(&table, reader)
        .with_context(|| format!("failed to import {} into {table}", file.display()))?;
      if report.created {
        println!("created table {table}");
      }
      println!("imported {} row(s) into {table}", report.rows_inserted);
    }
    TableCmd::Export { project, table, out } => {
      let p = open(settings, &project)?;
      match out {
        Some(path) => {
          let file =
            File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
          let n = p.export_csv_writer(&table, file)?;
          println!("exported {n} row(s) to {}", path.display());
        }
        None => {
          p.export_csv_writer(&table, io::stdout().lock())?;
        }
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn assignments() {
    assert_eq!(parse_assignment("notes=a=b").unwrap(), ("notes".into(), "a=b".into()));
    assert_eq!(parse_assignment("notes=").unwrap(), ("notes".into(), String::new()));
    assert!(parse_assignment("=x").is_err());
    assert!(parse_assignment("notes").is_err());
  }
}
