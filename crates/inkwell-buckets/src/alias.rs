//! Named aliases from the working area to bucket source directories.
//!
//! [`SymlinkAliases`] uses the platform's directory symlinks. Where those are
//! unavailable, [`RedirectAliases`] records the target in a small JSON file
//! next to where the link would have been.

use std::{
  ffi::OsString,
  fs, io,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

/// A way of making `alias` resolve to `target`.
pub trait AliasFs {
  fn create_alias(&self, target: &Path, alias: &Path) -> io::Result<()>;

  /// Whether anything already occupies the alias name.
  fn alias_exists(&self, alias: &Path) -> bool;

  fn remove_alias(&self, alias: &Path) -> io::Result<()>;

  /// The directory `alias` points at.
  fn resolve_alias(&self, alias: &Path) -> io::Result<PathBuf>;
}

// ─── Symlinks ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
pub struct SymlinkAliases;

impl AliasFs for SymlinkAliases {
  fn create_alias(&self, target: &Path, alias: &Path) -> io::Result<()> {
    #[cfg(unix)]
    {
      std::os::unix::fs::symlink(target, alias)
    }
    #[cfg(windows)]
    {
      std::os::windows::fs::symlink_dir(target, alias)
    }
    #[cfg(not(any(unix, windows)))]
    {
      let _ = (target, alias);
      Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
      ))
    }
  }

  fn alias_exists(&self, alias: &Path) -> bool { alias.symlink_metadata().is_ok() }

  fn remove_alias(&self, alias: &Path) -> io::Result<()> {
    let meta = alias.symlink_metadata()?;
    if !meta.file_type().is_symlink() {
      return Err(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("{} is not a symbolic link", alias.display()),
      ));
    }
    #[cfg(windows)]
    {
      fs::remove_dir(alias)
    }
    #[cfg(not(windows))]
    {
      fs::remove_file(alias)
    }
  }

  fn resolve_alias(&self, alias: &Path) -> io::Result<PathBuf> { fs::read_link(alias) }
}

// ─── Redirect records ────────────────────────────────────────────────────────

/// Suffix appended to the alias name to form the record file name.
pub const REDIRECT_SUFFIX: &str = ".alias.json";

#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectAliases;

#[derive(Debug, Serialize, Deserialize)]
struct Redirect {
  target: PathBuf,
}

impl RedirectAliases {
  /// `<dir>/<name>.alias.json` for an alias at `<dir>/<name>`.
  pub fn record_path(alias: &Path) -> PathBuf {
    let mut file: OsString = alias.file_name().map(OsString::from).unwrap_or_default();
    file.push(REDIRECT_SUFFIX);
    alias.with_file_name(file)
  }
}

impl AliasFs for RedirectAliases {
  fn create_alias(&self, target: &Path, alias: &Path) -> io::Result<()> {
    let record = Self::record_path(alias);
    let body = serde_json::to_vec_pretty(&Redirect { target: target.to_path_buf() })?;
    let mut file = fs::OpenOptions::new()
      .write(true)
      .create_new(true)
      .open(&record)?;
    io::Write::write_all(&mut file, &body)
  }

  fn alias_exists(&self, alias: &Path) -> bool {
    alias.symlink_metadata().is_ok() || Self::record_path(alias).symlink_metadata().is_ok()
  }

  fn remove_alias(&self, alias: &Path) -> io::Result<()> { fs::remove_file(Self::record_path(alias)) }

  fn resolve_alias(&self, alias: &Path) -> io::Result<PathBuf> {
    let text = fs::read_to_string(Self::record_path(alias))?;
    let redirect: Redirect = serde_json::from_str(&text)?;
    Ok(redirect.target)
  }
}

#[cfg(test)]
mod tests {
  use tempfile::TempDir;

  use super::*;

  #[test]
  fn redirect_round_trip() {
    let dir = TempDir::new().unwrap();
    let alias = dir.path().join("scripts");
    let aliases = RedirectAliases;

    assert!(!aliases.alias_exists(&alias));
    aliases.create_alias(Path::new("/data/scripts"), &alias).unwrap();
    assert!(aliases.alias_exists(&alias));
    assert!(dir.path().join("scripts.alias.json").is_file());
    assert_eq!(aliases.resolve_alias(&alias).unwrap(), PathBuf::from("/data/scripts"));

    let again = aliases.create_alias(Path::new("/elsewhere"), &alias).unwrap_err();
    assert_eq!(again.kind(), io::ErrorKind::AlreadyExists);

    aliases.remove_alias(&alias).unwrap();
    assert!(!aliases.alias_exists(&alias));
  }

  #[cfg(unix)]
  #[test]
  fn symlink_round_trip() {
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("source");
    fs::create_dir(&target).unwrap();
    let alias = dir.path().join("link");
    let aliases = SymlinkAliases;

    aliases.create_alias(&target, &alias).unwrap();
    assert!(aliases.alias_exists(&alias));
    assert_eq!(aliases.resolve_alias(&alias).unwrap(), target);
    assert!(alias.join(".").is_dir());

    assert!(aliases.remove_alias(&target).is_err());
    aliases.remove_alias(&alias).unwrap();
    assert!(!aliases.alias_exists(&alias));
    assert!(target.is_dir());
  }
}
