//! # vstore-core
//!
//! Core crate for the virtual storage service. Contains the configuration
//! schema, typed identifiers, the pure path translator, name validation,
//! the disk store trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other vstore crates and
//! performs no I/O of its own.

pub mod config;
pub mod error;
pub mod paths;
pub mod result;
pub mod traits;
pub mod types;
pub mod validation;

pub use error::AppError;
pub use paths::PathTranslator;
pub use result::AppResult;
