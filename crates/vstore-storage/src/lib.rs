//! # vstore-storage
//!
//! Disk store implementations. The local filesystem provider is the only
//! backend; it mirrors the virtual tree under a single storage root.

pub mod providers;

pub use providers::LocalDiskStore;
