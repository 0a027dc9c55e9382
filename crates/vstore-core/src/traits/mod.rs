//! Core traits defined in `vstore-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, DiskStore};
