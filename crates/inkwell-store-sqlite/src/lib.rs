//! SQLite backend for Inkwell projects.
//!
//! [`ProjectStore`] creates, lists and opens projects under a root directory;
//! [`Project`] is an open store and implements
//! [`TableEditor`](inkwell_core::editor::TableEditor).

mod csv_io;
mod editor;
mod encode;
mod project;
mod schema;
mod store;

pub mod error;

pub use csv_io::read_csv;
pub use error::{Error, Result};
pub use project::Project;
pub use store::{CreatedProject, InitReport, ProjectNames, ProjectStore, STORE_EXTENSION};
