//! # vstore-database
//!
//! The catalog store. Defines the repository traits the coordinators
//! program against, PostgreSQL implementations over sqlx, and an
//! in-memory implementation with the same uniqueness, ordering, and
//! cascade rules.

pub mod catalog;
pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;

pub use catalog::{ArchiveCatalog, Catalog, FileCatalog, FolderCatalog};
pub use connection::DatabasePool;
pub use memory::MemoryCatalog;
