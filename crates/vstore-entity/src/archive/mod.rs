//! Resource archive records.

pub mod model;

pub use model::{CreateArchive, ResourceArchive};
