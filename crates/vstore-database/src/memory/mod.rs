//! Process-local catalog backend.

mod store;

pub use store::MemoryCatalog;
