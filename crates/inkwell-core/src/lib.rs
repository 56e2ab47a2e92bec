//! Core types and trait definitions for the Inkwell project store.
//!
//! No database or filesystem access happens here. The SQLite backend and the
//! command-line front end build on these types.

pub mod editor;
pub mod error;
pub mod ident;
pub mod project;
pub mod registry;
pub mod schema;

pub use error::{Error, Result};
