//! Knowledge bucket registry.
//!
//! A bucket is a directory of precomputed retrieval artifacts. This crate
//! checks bucket directories, counts their contents, writes the registry
//! configuration consumed by the retrieval engine, and links buckets into a
//! shared working area. Bucket sources are never modified.

pub mod alias;
pub mod artifact;
pub mod config;
pub mod discover;
pub mod error;
pub mod registry;
pub mod stats;

pub use alias::{AliasFs, RedirectAliases, SymlinkAliases};
pub use artifact::{ArtifactKind, format_size};
pub use config::{BucketConfig, BucketMetadata, BucketSpec, Provenance, build_configuration, persist};
pub use discover::{BucketReport, BucketStatus, discover};
pub use error::{Error, Result};
pub use registry::{BucketRegistry, LinkReport, SyncReport};
pub use stats::{BucketStats, StatsReport, compute_stats};

#[cfg(test)]
mod tests;
