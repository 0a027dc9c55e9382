//! File coordinator.

pub mod service;

pub use service::{Download, FileService, FolderTarget, UpdateFileRequest, UploadFileRequest};
