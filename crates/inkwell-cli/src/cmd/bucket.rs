//! `bucket` subcommands over the buckets declared in the settings file.

use std::{collections::BTreeMap, path::PathBuf};

use chrono::Utc;
use clap::Subcommand;
use inkwell_buckets::{
  AliasFs, BucketRegistry, BucketStatus, LinkReport, Provenance, RedirectAliases, StatsReport,
  SymlinkAliases, discover,
};

use crate::settings::{AliasMode, Settings};

#[derive(Subcommand, Debug)]
pub enum BucketCmd {
  /// Check each bucket's source directory for its artifacts.
  Check,
  /// Count entities, relationships and chunks in the working area.
  Stats,
  /// Link bucket sources into the working area.
  Link,
  /// Check, register and link every bucket, writing the configuration file.
  Sync,
}

fn print_stats(stats: &StatsReport) {
  println!("{:<20} {:>10} {:>12} {:>12} {:>10}", "Bucket", "Entities", "Relations", "Chunks", "Documents");
  for b in &stats.buckets {
    println!(
      "{:<20} {:>10} {:>12} {:>12} {:>10}",
      b.name, b.entities, b.relationships, b.chunks, b.documents
    );
  }
  let t = &stats.totals;
  println!(
    "{:<20} {:>10} {:>12} {:>12} {:>10}",
    "TOTAL", t.entities, t.relationships, t.chunks, t.documents
  );
}

fn print_links(links: &LinkReport) {
  for name in &links.linked {
    println!("linked   {name}");
  }
  for name in &links.already_present {
    println!("present  {name}");
  }
  for err in &links.failed {
    eprintln!("failed   {err}");
  }
}

fn with_registry<A: AliasFs>(
  settings: &Settings,
  registry: BucketRegistry<A>,
  cmd: BucketCmd,
) -> anyhow::Result<()> {
  let buckets = &settings.buckets;
  match cmd {
    BucketCmd::Check => {
      let names: Vec<&str> = buckets.keys().map(String::as_str).collect();
      let roots: BTreeMap<String, PathBuf> = buckets
        .iter()
        .map(|(name, spec)| (name.clone(), spec.source.clone()))
        .collect();

      for report in discover(&names, &roots) {
        match &report.status {
          BucketStatus::Complete { sizes } => {
            println!("complete {}", report.name);
            for size in sizes {
              println!("         {:<26} {}", size.kind.file_name(), size.display_size());
            }
          }
          BucketStatus::MissingFiles { missing } => {
            let files: Vec<&str> = missing.iter().map(|k| k.file_name()).collect();
            println!("partial  {}: missing {}", report.name, files.join(", "));
          }
          BucketStatus::MissingDirectory => match &report.source {
            Some(source) => println!("missing  {}: {} not found", report.name, source.display()),
            None => println!("missing  {}: no source configured", report.name),
          },
        }
      }
    }
    BucketCmd::Stats => {
      let names: Vec<&str> = buckets.keys().map(String::as_str).collect();
      print_stats(&registry.stats(&names));
    }
    BucketCmd::Link => print_links(&registry.link_into_working_area(buckets)?),
    BucketCmd::Sync => {
      let provenance = Provenance { source: settings.source_label.clone(), recorded_at: Utc::now() };
      let report = registry.sync(buckets, &provenance)?;
      for err in &report.incomplete {
        eprintln!("inactive {err}");
      }
      print_stats(&report.stats);
      print_links(&report.links);
      println!("active: {}", report.config.active.join(", "));
      println!("wrote {}", report.config_path.display());
    }
  }
  Ok(())
}

pub fn run(settings: &Settings, cmd: BucketCmd) -> anyhow::Result<()> {
  let area = &settings.working_area;
  match settings.aliases {
    AliasMode::Symlink => with_registry(
      settings,
      BucketRegistry::new(area, SymlinkAliases).with_config_file(&settings.config_file),
      cmd,
    ),
    AliasMode::Redirect => with_registry(
      settings,
      BucketRegistry::new(area, RedirectAliases).with_config_file(&settings.config_file),
      cmd,
    ),
  }
}
