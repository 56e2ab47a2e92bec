//! Rendering SQLite values as editor text, and building statement text for
//! tables whose shape is only known at run time.

use inkwell_core::ident::quote_ident;
use rusqlite::types::ValueRef;

/// Render a stored value as text. `NULL` becomes `None`.
pub fn value_to_text(value: ValueRef<'_>) -> Option<String> {
  match value {
    ValueRef::Null => None,
    ValueRef::Integer(i) => Some(i.to_string()),
    ValueRef::Real(f) => Some(f.to_string()),
    ValueRef::Text(t) | ValueRef::Blob(t) => Some(String::from_utf8_lossy(t).into_owned()),
  }
}

/// `"a", "b", "c"`
pub fn column_list<S: AsRef<str>>(columns: &[S]) -> String {
  columns
    .iter()
    .map(|c| quote_ident(c.as_ref()))
    .collect::<Vec<_>>()
    .join(", ")
}

/// `?1, ?2, ?3`
pub fn placeholders(n: usize) -> String {
  (1..=n)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

/// `CREATE TABLE "t" ("a" TEXT, "b" TEXT)`
pub fn create_text_table<S: AsRef<str>>(table: &str, columns: &[S]) -> String {
  let cols = columns
    .iter()
    .map(|c| format!("{} TEXT", quote_ident(c.as_ref())))
    .collect::<Vec<_>>()
    .join(", ");
  format!("CREATE TABLE {} ({cols})", quote_ident(table))
}
