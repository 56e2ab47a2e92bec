//! `project`, `meta` and `draft` subcommands.

use anyhow::Context as _;
use clap::Subcommand;
use inkwell_core::{project::DraftVersion, schema::DEFAULT_PROJECT_TYPE};

use super::{open, store};
use crate::settings::Settings;

#[derive(Subcommand, Debug)]
pub enum ProjectCmd {
  /// Create a project; disallowed characters in the name become `_`.
  New {
    name:         String,
    #[arg(long = "type", default_value = DEFAULT_PROJECT_TYPE)]
    project_type: String,
  },
  /// List every project under the projects root.
  List,
  /// Add missing base tables to every existing project.
  InitAll,
}

#[derive(Subcommand, Debug)]
pub enum MetaCmd {
  /// Print one value, or every entry when no key is given.
  Get { project: String, key: Option<String> },
  /// Insert or replace a value.
  Set { project: String, key: String, value: String },
}

#[derive(Subcommand, Debug)]
pub enum DraftCmd {
  /// Save the final text of one scene.
  Save {
    project: String,
    act:     i64,
    scene:   i64,
    text:    String,
    /// Draft version to write to (default: the current version).
    #[arg(long)]
    version: Option<DraftVersion>,
  },
  /// Print every scene of a version.
  Show {
    project: String,
    #[arg(long)]
    version: Option<DraftVersion>,
  },
  /// Start the next draft version.
  NewVersion { project: String },
}

pub fn run_project(settings: &Settings, cmd: ProjectCmd) -> anyhow::Result<()> {
  let store = store(settings);
  match cmd {
    ProjectCmd::New { name, project_type } => {
      let created = store
        .create_with_type(&name, &project_type)
        .with_context(|| format!("failed to create project {name}"))?;
      if created.name.substituted {
        println!("name {name:?} stored as {:?}", created.name.name);
      }
      println!("created {} at {}", created.name.name, created.path.display());
    }
    ProjectCmd::List => {
      let mut names: Vec<String> = store.list()?.collect();
      names.sort();
      for name in names {
        println!("{name}");
      }
    }
    ProjectCmd::InitAll => {
      let report = store.initialize_all()?;
      for name in &report.touched {
        println!("updated  {name}");
      }
      for (name, err) in &report.failed {
        eprintln!("failed   {name}: {err}");
      }
      println!(
        "{} updated, {} already current, {} failed",
        report.touched_count(),
        report.up_to_date.len(),
        report.failed.len()
      );
    }
  }
  Ok(())
}

pub fn run_meta(settings: &Settings, cmd: MetaCmd) -> anyhow::Result<()> {
  match cmd {
    MetaCmd::Get { project, key: Some(key) } => {
      let value = open(settings, &project)?
        .get_metadata(&key)?
        .with_context(|| format!("no metadata key {key} in project {project}"))?;
      println!("{value}");
    }
    MetaCmd::Get { project, key: None } => {
      for entry in open(settings, &project)?.metadata()? {
        println!("{}\t{}", entry.key, entry.value.unwrap_or_default());
      }
    }
    MetaCmd::Set { project, key, value } => {
      open(settings, &project)?.set_metadata(&key, &value)?;
    }
  }
  Ok(())
}

pub fn run_draft(settings: &Settings, cmd: DraftCmd) -> anyhow::Result<()> {
  match cmd {
    DraftCmd::Save { project, act, scene, text, version } => {
      let mut p = open(settings, &project)?;
      let version = match version {
        Some(v) => v,
        None => p.current_version()?,
      };
      p.save_draft(version, act, scene, &text)?;
      println!("saved act {act} scene {scene} in {version}");
    }
    DraftCmd::Show { project, version } => {
      let p = open(settings, &project)?;
      let version = match version {
        Some(v) => v,
        None => p.current_version()?,
      };
      for scene in p.drafts(version)? {
        println!("── {} act {} scene {} ──", scene.version, scene.act, scene.scene);
        println!("{}\n", scene.final_text);
      }
    }
    DraftCmd::NewVersion { project } => {
      let version = open(settings, &project)?.start_new_version()?;
      println!("now writing {version}");
    }
  }
  Ok(())
}
