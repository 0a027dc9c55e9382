//! Folder coordinator.

pub mod service;

pub use service::{CreateFolderRequest, FolderContents, FolderService, UpdateFolderRequest};
