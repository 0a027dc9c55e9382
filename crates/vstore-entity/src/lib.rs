//! # vstore-entity
//!
//! Catalog entity models. Every row struct derives `Debug`, `Clone`,
//! `Serialize`, `Deserialize`, and `sqlx::FromRow`. Insert payloads carry
//! exactly the caller-supplied columns; update payloads are explicit
//! optional-field structs where `None` means "leave unchanged".

pub mod archive;
pub mod file;
pub mod folder;
pub mod location;

pub use archive::{CreateArchive, ResourceArchive};
pub use file::{CreateFile, File, UpdateFile};
pub use folder::{CreateFolder, Folder, UpdateFolder};
pub use location::Location;
