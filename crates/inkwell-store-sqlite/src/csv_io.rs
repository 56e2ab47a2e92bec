//! The CSV file boundary: UTF-8 text, first record is the header.

use std::io::{Read, Write};

use inkwell_core::editor::{ImportReport, TableEditor};

use crate::{Project, Result};

/// Read a header and every data record from `reader`.
///
/// Records of differing lengths are passed through unchanged so the editor
/// can report the mismatch against the table's shape.
pub fn read_csv<R: Read>(reader: R) -> Result<(Vec<String>, Vec<Vec<String>>)> {
  let mut rdr = csv::ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .from_reader(reader);

  let header = rdr.headers()?.iter().map(str::to_owned).collect();
  let records = rdr
    .records()
    .map(|rec| rec.map(|r| r.iter().map(str::to_owned).collect()))
    .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;

  Ok((header, records))
}

impl Project {
  /// Parse CSV from `reader` and import it into `table`.
  pub fn import_csv_reader<R: Read>(&mut self, table: &str, reader: R) -> Result<ImportReport> {
    let (header, records) = read_csv(reader)?;
    self.import_csv(table, &header, &records)
  }

  /// Write `table` to `writer` as CSV. Returns the number of data records.
  pub fn export_csv_writer<W: Write>(&self, table: &str, writer: W) -> Result<usize> {
    let data = self.export_csv(table)?;
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(&data.header)?;
    for record in &data.records {
      wtr.write_record(record)?;
    }
    wtr.flush().map_err(|e| crate::Error::io("<csv output>", e))?;
    Ok(data.records.len())
  }
}
