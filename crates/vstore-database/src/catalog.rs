//! Catalog repository traits and the bundle the service layer is wired with.
//!
//! Every mutating call is atomic with respect to other catalog calls. No
//! call is ordered with respect to disk operations; that ordering belongs
//! to the coordinators.

use std::sync::Arc;

use async_trait::async_trait;

use vstore_core::error::AppError;
use vstore_core::result::AppResult;
use vstore_core::types::{ArchiveId, FileId, FolderId};
use vstore_entity::{
    CreateArchive, CreateFile, CreateFolder, File, Folder, ResourceArchive, UpdateFile,
    UpdateFolder,
};

use crate::connection::DatabasePool;
use crate::memory::MemoryCatalog;
use crate::repositories::{ArchiveRepository, FileRepository, FolderRepository};

/// Folder rows.
#[async_trait]
pub trait FolderCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a folder; the catalog assigns id and timestamps.
    ///
    /// `Conflict` on a duplicate virtual or storage path, `NotFound` if the
    /// parent no longer exists.
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder>;

    /// Look up a folder by id.
    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>>;

    /// Look up a folder by its virtual path.
    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<Folder>>;

    /// Direct children of `parent_id` (root-level when `None`), ordered by
    /// name then id.
    async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<Folder>>;

    /// Apply a partial update. A new location also rebases the paths of
    /// every descendant folder and file in the same transaction.
    async fn update(&self, id: FolderId, changes: &UpdateFolder) -> AppResult<Folder>;

    /// Delete a folder together with all descendant folders, files, and
    /// archive records.
    async fn delete(&self, id: FolderId) -> AppResult<()>;

    /// Like [`find_by_id`](Self::find_by_id) but `NotFound` when absent.
    async fn get_by_id(&self, id: FolderId) -> AppResult<Folder> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    /// Like [`find_by_virtual_path`](Self::find_by_virtual_path) but
    /// `NotFound` when absent.
    async fn get_by_virtual_path(&self, virtual_path: &str) -> AppResult<Folder> {
        self.find_by_virtual_path(virtual_path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder '{virtual_path}' not found")))
    }
}

/// File rows.
#[async_trait]
pub trait FileCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Insert a file with its pre-generated id.
    async fn create(&self, data: &CreateFile) -> AppResult<File>;

    /// Look up a file by id.
    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>>;

    /// Look up a file by its virtual path.
    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<File>>;

    /// Files directly inside `folder_id` (root-level when `None`), ordered
    /// by name then id.
    async fn list_by_folder(&self, folder_id: Option<FolderId>) -> AppResult<Vec<File>>;

    /// Apply a partial update.
    async fn update(&self, id: FileId, changes: &UpdateFile) -> AppResult<File>;

    /// Delete a file row.
    async fn delete(&self, id: FileId) -> AppResult<()>;

    /// Like [`find_by_id`](Self::find_by_id) but `NotFound` when absent.
    async fn get_by_id(&self, id: FileId) -> AppResult<File> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Like [`find_by_virtual_path`](Self::find_by_virtual_path) but
    /// `NotFound` when absent.
    async fn get_by_virtual_path(&self, virtual_path: &str) -> AppResult<File> {
        self.find_by_virtual_path(virtual_path)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File '{virtual_path}' not found")))
    }
}

/// Resource archive rows.
#[async_trait]
pub trait ArchiveCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Record an archive of an existing folder.
    async fn create(&self, data: &CreateArchive) -> AppResult<ResourceArchive>;

    /// Archives of a folder, newest first.
    async fn list_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<ResourceArchive>>;

    /// Delete an archive record.
    async fn delete(&self, id: ArchiveId) -> AppResult<()>;
}

/// The three repositories behind one handle.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Folder repository.
    pub folders: Arc<dyn FolderCatalog>,
    /// File repository.
    pub files: Arc<dyn FileCatalog>,
    /// Archive repository.
    pub archives: Arc<dyn ArchiveCatalog>,
    /// Present for the PostgreSQL backend.
    pool: Option<DatabasePool>,
}

impl Catalog {
    /// Repositories over a PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            folders: Arc::new(FolderRepository::new(pg.clone())),
            files: Arc::new(FileRepository::new(pg.clone())),
            archives: Arc::new(ArchiveRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// A fresh, empty in-memory catalog.
    pub fn memory() -> Self {
        Self::from_memory(MemoryCatalog::new())
    }

    /// Share an existing in-memory catalog.
    pub fn from_memory(store: MemoryCatalog) -> Self {
        Self {
            folders: Arc::new(store.clone()),
            files: Arc::new(store.clone()),
            archives: Arc::new(store),
            pool: None,
        }
    }

    /// Backend name for logs and health output.
    pub fn backend(&self) -> &'static str {
        if self.pool.is_some() {
            "postgres"
        } else {
            "memory"
        }
    }

    /// Check catalog connectivity.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.health_check().await,
            None => Ok(true),
        }
    }

    /// Release pooled connections, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}
