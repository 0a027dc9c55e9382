//! Core type definitions used across the workspace.

pub mod id;

pub use id::*;
