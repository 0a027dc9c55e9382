//! Disk store providers.

pub mod local;

pub use local::LocalDiskStore;
