//! Typed records for the tables a project declares.
//!
//! The generic editor works in untyped text; these types back the
//! project-level helpers (metadata, drafts, brainstorming history).

use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Draft versions ──────────────────────────────────────────────────────────

/// A generation of finalized scene text. Versions start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct DraftVersion(NonZeroU32);

impl DraftVersion {
  pub const FIRST: Self = Self(NonZeroU32::MIN);

  pub fn new(n: u32) -> Result<Self> {
    NonZeroU32::new(n)
      .map(Self)
      .ok_or(Error::InvalidDraftVersion(n))
  }

  pub fn get(self) -> u32 { self.0.get() }

  /// The version after this one, saturating at `u32::MAX`.
  pub fn next(self) -> Self { Self(self.0.saturating_add(1)) }
}

impl Default for DraftVersion {
  fn default() -> Self { Self::FIRST }
}

impl TryFrom<u32> for DraftVersion {
  type Error = Error;

  fn try_from(n: u32) -> Result<Self> { Self::new(n) }
}

impl From<DraftVersion> for u32 {
  fn from(v: DraftVersion) -> u32 { v.get() }
}

impl FromStr for DraftVersion {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let n: u32 = s
      .trim()
      .parse()
      .map_err(|_| Error::InvalidDraftVersion(0))?;
    Self::new(n)
  }
}

impl fmt::Display for DraftVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "v{}", self.0) }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// One `project_metadata` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
  pub key:        String,
  pub value:      Option<String>,
  pub updated_at: String,
}

/// One scene of a finalized draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftScene {
  pub version:    DraftVersion,
  pub act:        i64,
  pub scene:      i64,
  pub final_text: String,
}

/// A brainstorming session outcome to append to the log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrainstormEntry {
  pub act:               Option<i64>,
  pub scene:             Option<i64>,
  pub scene_description: Option<String>,
  pub bucket_name:       Option<String>,
  pub tone_preset:       Option<String>,
  pub response:          String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zero_is_not_a_version() {
    assert!(matches!(DraftVersion::new(0), Err(Error::InvalidDraftVersion(0))));
    assert!("0".parse::<DraftVersion>().is_err());
    assert!("abc".parse::<DraftVersion>().is_err());
  }

  #[test]
  fn versions_count_up() {
    let v = DraftVersion::default();
    assert_eq!(v, DraftVersion::FIRST);
    assert_eq!(v.next().get(), 2);
    assert_eq!(" 3 ".parse::<DraftVersion>().unwrap().get(), 3);
    assert_eq!(DraftVersion::new(4).unwrap().to_string(), "v4");
  }
}
