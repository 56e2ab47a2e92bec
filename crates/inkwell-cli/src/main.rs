//! `inkwell`: command-line front end for Inkwell projects and knowledge
//! buckets.
//!
//! # Usage
//!
//! ```
//! inkwell project new "Second Chances"
//! inkwell table rows Second_Chances characters
//! inkwell table update Second_Chances characters 3 notes="allergic to cats"
//! inkwell --config ~/writing/inkwell.toml bucket sync
//! ```

mod cmd;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use settings::{Overrides, Settings};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "inkwell", version, about = "Creative-writing project stores and knowledge buckets")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, value_name = "FILE", default_value = "inkwell.toml")]
  config: PathBuf,

  /// Directory holding one subdirectory per project.
  #[arg(long, value_name = "DIR", env = "INKWELL_PROJECTS_ROOT")]
  projects_root: Option<PathBuf>,

  /// Shared directory for bucket aliases and the bucket configuration.
  #[arg(long, value_name = "DIR", env = "INKWELL_WORKING_AREA")]
  working_area: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Create, list and upgrade projects.
  Project {
    #[command(subcommand)]
    cmd: cmd::project::ProjectCmd,
  },
  /// Edit any table of a project.
  Table {
    #[command(subcommand)]
    cmd: cmd::table::TableCmd,
  },
  /// Read and write project metadata.
  Meta {
    #[command(subcommand)]
    cmd: cmd::project::MetaCmd,
  },
  /// Save and show finalized scene text.
  Draft {
    #[command(subcommand)]
    cmd: cmd::project::DraftCmd,
  },
  /// Check, count, link and register knowledge buckets.
  Bucket {
    #[command(subcommand)]
    cmd: cmd::bucket::BucketCmd,
  },
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = Settings::load(&cli.config, Overrides {
    projects_root: cli.projects_root,
    working_area:  cli.working_area,
  })?;

  match cli.command {
    Command::Project { cmd } => cmd::project::run_project(&settings, cmd),
    Command::Table { cmd } => cmd::table::run(&settings, cmd),
    Command::Meta { cmd } => cmd::project::run_meta(&settings, cmd),
    Command::Draft { cmd } => cmd::project::run_draft(&settings, cmd),
    Command::Bucket { cmd } => cmd::bucket::run(&settings, cmd),
  }
}
