//! # vstore-service
//!
//! Coordinators that keep the physical directory tree and the catalog in
//! step. Every mutation validates first, probes the catalog for
//! collisions, performs the disk step, then the catalog step; a failed
//! catalog step undoes the disk step where that is possible.
//!
//! Services follow constructor injection. All dependencies are provided at
//! construction time via `Arc` references.

pub mod archive;
pub mod file;
pub mod folder;
pub mod locks;
mod undo;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use vstore_core::paths::PathTranslator;
use vstore_core::traits::storage::DiskStore;
use vstore_database::catalog::Catalog;

pub use archive::ArchiveService;
pub use file::{Download, FileService, FolderTarget, UpdateFileRequest, UploadFileRequest};
pub use folder::{CreateFolderRequest, FolderContents, FolderService, UpdateFolderRequest};
pub use locks::PathLocks;

/// All coordinators, sharing one lock table.
#[derive(Debug, Clone)]
pub struct Services {
    /// Folder coordinator.
    pub folders: FolderService,
    /// File coordinator.
    pub files: FileService,
    /// Archive records.
    pub archives: ArchiveService,
}

impl Services {
    /// Wire the coordinators over a catalog and a disk store.
    pub fn new(
        catalog: &Catalog,
        disk: Arc<dyn DiskStore>,
        paths: PathTranslator,
        allowed_extensions: Option<Vec<String>>,
    ) -> Self {
        let locks = PathLocks::new();
        Self {
            folders: FolderService::new(
                Arc::clone(&catalog.folders),
                Arc::clone(&catalog.files),
                Arc::clone(&disk),
                paths.clone(),
                locks.clone(),
            ),
            files: FileService::new(
                Arc::clone(&catalog.files),
                Arc::clone(&catalog.folders),
                disk,
                paths,
                locks,
                allowed_extensions,
            ),
            archives: ArchiveService::new(
                Arc::clone(&catalog.archives),
                Arc::clone(&catalog.folders),
            ),
        }
    }
}
