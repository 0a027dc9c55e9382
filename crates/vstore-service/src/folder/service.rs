//! Folder coordinator: keeps the directory tree and the folder rows in step.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use vstore_core::error::AppError;
use vstore_core::paths::{PathTranslator, is_within, normalize_folder_path, parent_prefix};
use vstore_core::result::AppResult;
use vstore_core::traits::storage::DiskStore;
use vstore_core::types::{FolderId, UserId};
use vstore_core::validation::validate_folder_name;
use vstore_database::catalog::{FileCatalog, FolderCatalog};
use vstore_entity::{CreateFolder, File, Folder, Location, UpdateFolder};

use crate::locks::PathLocks;
use crate::undo::compensate;

/// Request to create a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolderRequest {
    /// Folder name (one path segment).
    pub name: String,
    /// Parent folder (root-level when `None`).
    pub parent_id: Option<FolderId>,
    /// The creating user.
    pub creator_user_id: UserId,
    /// Publication flag.
    pub is_published: bool,
}

/// Partial folder update. `parent_id: Some(None)` moves the folder to the
/// root level.
#[derive(Debug, Clone, Default)]
pub struct UpdateFolderRequest {
    /// New name.
    pub name: Option<String>,
    /// New parent.
    pub parent_id: Option<Option<FolderId>>,
    /// New publication flag.
    pub is_published: Option<bool>,
}

/// A folder (or the root level) with its direct children.
#[derive(Debug, Clone, Serialize)]
pub struct FolderContents {
    /// The listed folder, `None` for the root level.
    pub folder: Option<Folder>,
    /// Child folders ordered by name.
    pub folders: Vec<Folder>,
    /// Files directly inside, ordered by name.
    pub files: Vec<File>,
}

/// Creates, moves, renames, and deletes folders on disk and in the catalog.
#[derive(Debug, Clone)]
pub struct FolderService {
    /// Folder rows.
    folders: Arc<dyn FolderCatalog>,
    /// File rows (for contents listings).
    files: Arc<dyn FileCatalog>,
    /// Physical tree.
    disk: Arc<dyn DiskStore>,
    /// Virtual to physical mapping.
    paths: PathTranslator,
    /// Per-path advisory locks shared with the file coordinator.
    locks: PathLocks,
}

impl FolderService {
    /// Creates a new folder service.
    pub fn new(
        folders: Arc<dyn FolderCatalog>,
        files: Arc<dyn FileCatalog>,
        disk: Arc<dyn DiskStore>,
        paths: PathTranslator,
        locks: PathLocks,
    ) -> Self {
        Self {
            folders,
            files,
            disk,
            paths,
            locks,
        }
    }

    /// Gets a folder by ID.
    pub async fn get(&self, id: FolderId) -> AppResult<Folder> {
        self.folders.get_by_id(id).await
    }

    /// Gets a folder by virtual path. Missing leading or trailing
    /// separators are tolerated.
    pub async fn get_by_virtual_path(&self, path: &str) -> AppResult<Folder> {
        self.folders
            .get_by_virtual_path(&normalize_folder_path(path))
            .await
    }

    /// Lists direct child folders. A missing parent is `NotFound`.
    pub async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<Folder>> {
        if let Some(id) = parent_id {
            self.folders.get_by_id(id).await?;
        }
        self.folders.list_children(parent_id).await
    }

    /// Lists child folders and files of a folder or of the root level.
    pub async fn contents(&self, parent_id: Option<FolderId>) -> AppResult<FolderContents> {
        let folder = match parent_id {
            Some(id) => Some(self.folders.get_by_id(id).await?),
            None => None,
        };
        let folders = self.folders.list_children(parent_id).await?;
        let files = self.files.list_by_folder(parent_id).await?;
        Ok(FolderContents {
            folder,
            folders,
            files,
        })
    }

    /// Creates a folder directory and its catalog row.
    pub async fn create(&self, req: CreateFolderRequest) -> AppResult<Folder> {
        validate_folder_name(&req.name)?;

        let parent = self.load_parent(req.parent_id).await?;
        let virtual_path = self
            .paths
            .folder_path(parent.as_ref().map(|p| p.virtual_path.as_str()), &req.name);

        let _guard = self.locks.acquire(&[virtual_path.as_str()]).await;
        self.confirm_parent(parent.as_ref()).await?;

        if self
            .folders
            .find_by_virtual_path(&virtual_path)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Folder '{virtual_path}' already exists"
            )));
        }

        let physical = self.paths.to_physical(&virtual_path);
        self.disk.create_directory(&physical).await?;

        let record = CreateFolder {
            name: req.name,
            parent_id: req.parent_id,
            location: Location::new(
                virtual_path.clone(),
                self.paths.storage_path(&virtual_path),
            ),
            creator_user_id: req.creator_user_id,
            is_published: req.is_published,
        };

        let folder = match self.folders.create(&record).await {
            Ok(folder) => folder,
            Err(e) => {
                return Err(compensate(
                    "create_folder",
                    &physical,
                    e,
                    self.disk.remove_tree(&physical),
                )
                .await);
            }
        };

        info!(
            folder_id = %folder.id,
            virtual_path = %folder.virtual_path,
            "Folder created"
        );
        Ok(folder)
    }

    /// Renames, moves, or republishes a folder.
    ///
    /// When the virtual path changes the directory is renamed first, then
    /// the catalog row and every descendant row are rewritten. A catalog
    /// failure renames the directory back.
    pub async fn update(&self, id: FolderId, req: UpdateFolderRequest) -> AppResult<Folder> {
        if let Some(name) = &req.name {
            validate_folder_name(name)?;
        }

        let current = self.folders.get_by_id(id).await?;
        let name = req.name.clone().unwrap_or_else(|| current.name.clone());

        let new_parent = match req.parent_id {
            Some(Some(parent_id)) => {
                let parent = self.folders.get_by_id(parent_id).await?;
                if is_within(&parent.virtual_path, &current.virtual_path) {
                    return Err(AppError::validation(
                        "Cannot move a folder into itself or one of its descendants",
                    ));
                }
                Some(parent)
            }
            _ => None,
        };
        let target_path = match req.parent_id {
            Some(Some(_)) => self
                .paths
                .folder_path(new_parent.as_ref().map(|p| p.virtual_path.as_str()), &name),
            Some(None) => self.paths.folder_path(None, &name),
            None => self
                .paths
                .folder_path(Some(&parent_prefix(&current.virtual_path)), &name),
        };

        let changes = UpdateFolder {
            name: req.name,
            parent_id: req.parent_id,
            is_published: req.is_published,
            location: None,
        };

        if target_path == current.virtual_path {
            let _guard = self.locks.acquire(&[current.virtual_path.as_str()]).await;
            self.confirm_unchanged(&current).await?;
            if changes.is_empty() {
                return Ok(current);
            }
            let folder = self.folders.update(id, &changes).await?;
            info!(folder_id = %id, "Folder updated");
            return Ok(folder);
        }

        let _guard = self
            .locks
            .acquire(&[current.virtual_path.as_str(), target_path.as_str()])
            .await;
        self.confirm_unchanged(&current).await?;
        self.confirm_parent(new_parent.as_ref()).await?;

        if self
            .folders
            .find_by_virtual_path(&target_path)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "Folder '{target_path}' already exists"
            )));
        }

        let from = self.paths.to_physical(&current.virtual_path);
        let to = self.paths.to_physical(&target_path);
        self.disk.rename_or_move(&from, &to).await?;

        let changes = UpdateFolder {
            location: Some(Location::new(
                target_path.clone(),
                self.paths.storage_path(&target_path),
            )),
            ..changes
        };

        let folder = match self.folders.update(id, &changes).await {
            Ok(folder) => folder,
            Err(e) => {
                return Err(compensate(
                    "update_folder",
                    &to,
                    e,
                    self.disk.rename_or_move(&to, &from),
                )
                .await);
            }
        };

        info!(
            folder_id = %id,
            from = %current.virtual_path,
            to = %folder.virtual_path,
            "Folder relocated"
        );
        Ok(folder)
    }

    /// Deletes a folder with its whole subtree, directory first.
    pub async fn delete(&self, id: FolderId) -> AppResult<()> {
        let folder = self.folders.get_by_id(id).await?;

        let _guard = self.locks.acquire(&[folder.virtual_path.as_str()]).await;
        self.confirm_unchanged(&folder).await?;

        let physical = self.paths.to_physical(&folder.virtual_path);
        self.disk.remove_tree(&physical).await?;

        if let Err(e) = self.folders.delete(id).await {
            error!(
                folder_id = %id,
                virtual_path = %folder.virtual_path,
                error = %e,
                "Directory removed but catalog rows remain"
            );
            return Err(e);
        }

        info!(
            folder_id = %id,
            virtual_path = %folder.virtual_path,
            "Folder deleted"
        );
        Ok(())
    }

    async fn load_parent(&self, parent_id: Option<FolderId>) -> AppResult<Option<Folder>> {
        match parent_id {
            Some(id) => Ok(Some(self.folders.get_by_id(id).await?)),
            None => Ok(None),
        }
    }

    /// Re-read `expected` under the lock; it must still exist at the same
    /// virtual path.
    async fn confirm_unchanged(&self, expected: &Folder) -> AppResult<()> {
        let fresh = self.folders.get_by_id(expected.id).await?;
        if fresh.virtual_path != expected.virtual_path {
            return Err(AppError::conflict(format!(
                "Folder {} was moved concurrently",
                expected.id
            )));
        }
        Ok(())
    }

    async fn confirm_parent(&self, parent: Option<&Folder>) -> AppResult<()> {
        match parent {
            Some(parent) => self.confirm_unchanged(parent).await,
            None => Ok(()),
        }
    }
}
