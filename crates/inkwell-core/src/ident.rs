//! Naming rules for projects, tables and columns.
//!
//! Project names become directory and file names, table and column names are
//! spliced into SQL. Both are checked here before they reach either place.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Words that may not be used as a table name even though they match the
/// character rule.
const RESERVED_WORDS: &[&str] = &[
  "select", "insert", "update", "delete", "drop", "create", "alter", "union",
  "where",
];

// ─── Project names ───────────────────────────────────────────────────────────

/// The outcome of [`sanitize_project_name`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedName {
  /// The name actually used for the project.
  pub name:        String,
  /// `true` when at least one character of the input was replaced.
  pub substituted: bool,
}

fn is_name_char(c: char) -> bool { c.is_alphanumeric() || c == '_' || c == '-' }

/// Replace every character that is not a word character, hyphen or underscore
/// with `_`.
///
/// The input is trimmed first; an empty result is rejected.
pub fn sanitize_project_name(raw: &str) -> Result<SanitizedName> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return Err(Error::InvalidProjectName(raw.to_owned()));
  }

  let name: String = trimmed
    .chars()
    .map(|c| if is_name_char(c) { c } else { '_' })
    .collect();
  let substituted = name != trimmed;

  Ok(SanitizedName { name, substituted })
}

/// `true` if `name` would survive [`sanitize_project_name`] unchanged.
pub fn is_valid_project_name(name: &str) -> bool {
  !name.is_empty() && name.chars().all(is_name_char)
}

// ─── SQL identifiers ─────────────────────────────────────────────────────────

/// Check that `name` is usable as a table name.
///
/// Allowed: ASCII letters, digits, `_` and `-`. Rejected: the empty string,
/// reserved words, and SQLite's internal `sqlite_` namespace.
pub fn validate_table_name(name: &str) -> Result<()> {
  let chars_ok = !name.is_empty()
    && name
      .chars()
      .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
  let lower = name.to_ascii_lowercase();

  if !chars_ok || RESERVED_WORDS.contains(&lower.as_str()) || lower.starts_with("sqlite_") {
    return Err(Error::InvalidIdentifier(name.to_owned()));
  }
  Ok(())
}

/// Check a list of column names taken from a CSV header.
///
/// Column names are always quoted, so any text is allowed except the empty
/// string, NUL, and `"`. Duplicates are rejected.
pub fn validate_column_names<S: AsRef<str>>(names: &[S]) -> Result<()> {
  if names.is_empty() {
    return Err(Error::InvalidIdentifier(String::new()));
  }

  let mut seen = std::collections::HashSet::new();
  for name in names.iter().map(AsRef::as_ref) {
    let bad = name.trim().is_empty() || name.contains('\0') || name.contains('"');
    if bad || !seen.insert(name.to_ascii_lowercase()) {
      return Err(Error::InvalidIdentifier(name.to_owned()));
    }
  }
  Ok(())
}

/// Quote an identifier for use in SQL text.
pub fn quote_ident(name: &str) -> String { format!("\"{}\"", name.replace('"', "\"\"")) }
