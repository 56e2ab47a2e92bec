//! Subcommand implementations. Each prints plain text to stdout.

pub mod bucket;
pub mod project;
pub mod table;

use anyhow::Context as _;
use inkwell_store_sqlite::{Project, ProjectStore};

use crate::settings::Settings;

pub(crate) fn store(settings: &Settings) -> ProjectStore { ProjectStore::new(&settings.projects_root) }

pub(crate) fn open(settings: &Settings, name: &str) -> anyhow::Result<Project> {
  store(settings)
    .open(name)
    .with_context(|| format!("failed to open project {name}"))
}
