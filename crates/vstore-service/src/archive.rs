//! Resource archive records.

use std::sync::Arc;

use tracing::info;

use vstore_core::error::AppError;
use vstore_core::result::AppResult;
use vstore_core::types::{ArchiveId, FolderId};
use vstore_database::catalog::{ArchiveCatalog, FolderCatalog};
use vstore_entity::{CreateArchive, ResourceArchive};

/// Records which folders were bundled into archives.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    archives: Arc<dyn ArchiveCatalog>,
    folders: Arc<dyn FolderCatalog>,
}

impl ArchiveService {
    /// Creates a new archive service.
    pub fn new(archives: Arc<dyn ArchiveCatalog>, folders: Arc<dyn FolderCatalog>) -> Self {
        Self { archives, folders }
    }

    /// Records an archive of an existing folder.
    pub async fn record(&self, data: CreateArchive) -> AppResult<ResourceArchive> {
        if data.archive_path.trim().is_empty() {
            return Err(AppError::validation("Archive path cannot be empty"));
        }
        if data.size < 0 || data.file_count < 0 {
            return Err(AppError::validation(
                "Archive size and file count must not be negative",
            ));
        }
        self.folders.get_by_id(data.folder_id).await?;

        let archive = self.archives.create(&data).await?;
        info!(
            archive_id = %archive.id,
            folder_id = %archive.folder_id,
            "Archive recorded"
        );
        Ok(archive)
    }

    /// Archives of a folder, newest first.
    pub async fn list(&self, folder_id: FolderId) -> AppResult<Vec<ResourceArchive>> {
        self.folders.get_by_id(folder_id).await?;
        self.archives.list_by_folder(folder_id).await
    }

    /// Deletes an archive record.
    pub async fn delete(&self, id: ArchiveId) -> AppResult<()> {
        self.archives.delete(id).await?;
        info!(archive_id = %id, "Archive record deleted");
        Ok(())
    }
}
