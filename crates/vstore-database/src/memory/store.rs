//! In-memory catalog.
//!
//! All three tables live behind one `RwLock`, so a folder update that
//! rebases a subtree, or a delete that cascades through it, is applied
//! atomically. Every check runs before the first write of an operation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use vstore_core::error::AppError;
use vstore_core::paths::rebase;
use vstore_core::result::AppResult;
use vstore_core::types::{ArchiveId, FileId, FolderId};
use vstore_entity::{
    CreateArchive, CreateFile, CreateFolder, File, Folder, Location, ResourceArchive, UpdateFile,
    UpdateFolder,
};

use crate::catalog::{ArchiveCatalog, FileCatalog, FolderCatalog};

#[derive(Debug, Default)]
struct Tables {
    folders: HashMap<FolderId, Folder>,
    files: HashMap<FileId, File>,
    archives: HashMap<ArchiveId, ResourceArchive>,
}

impl Tables {
    fn require_folder(&self, id: FolderId) -> AppResult<()> {
        if self.folders.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Folder {id} not found")))
        }
    }

    /// Reject `location` if a folder outside `moving` already uses it.
    fn check_folder_paths(
        &self,
        location: &Location,
        moving: &[FolderId],
    ) -> AppResult<()> {
        let taken = self.folders.values().any(|f| {
            !moving.contains(&f.id)
                && (f.virtual_path == location.virtual_path
                    || f.storage_path == location.storage_path)
        });
        if taken {
            return Err(AppError::conflict(format!(
                "Folder '{}' already exists",
                location.virtual_path
            )));
        }
        Ok(())
    }

    /// Reject `location` if a file outside `moving` already uses it.
    fn check_file_paths(&self, location: &Location, moving: &[FileId]) -> AppResult<()> {
        let taken = self.files.values().any(|f| {
            !moving.contains(&f.id)
                && (f.virtual_path == location.virtual_path
                    || f.storage_path == location.storage_path)
        });
        if taken {
            return Err(AppError::conflict(format!(
                "File '{}' already exists",
                location.virtual_path
            )));
        }
        Ok(())
    }

    /// The folder and every folder beneath it, parents before children.
    fn subtree(&self, root: FolderId) -> Vec<FolderId> {
        let mut out = vec![root];
        let mut idx = 0;
        while idx < out.len() {
            let parent = out[idx];
            let mut children: Vec<FolderId> = self
                .folders
                .values()
                .filter(|f| f.parent_id == Some(parent))
                .map(|f| f.id)
                .collect();
            children.sort();
            out.extend(children);
            idx += 1;
        }
        out
    }
}

fn rebased(location: &Location, from: &Location, to: &Location) -> Option<Location> {
    Some(Location::new(
        rebase(&location.virtual_path, &from.virtual_path, &to.virtual_path)?,
        rebase(&location.storage_path, &from.storage_path, &to.storage_path)?,
    ))
}

fn by_name<T>(items: &mut [T], key: impl Fn(&T) -> (&str, String)) {
    items.sort_by(|a, b| key(a).cmp(&key(b)));
}

/// Process-local catalog with the same semantics as the PostgreSQL
/// repositories. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of (folders, files, archives) currently stored.
    pub async fn counts(&self) -> (usize, usize, usize) {
        let tables = self.tables.read().await;
        (
            tables.folders.len(),
            tables.files.len(),
            tables.archives.len(),
        )
    }
}

#[async_trait]
impl FolderCatalog for MemoryCatalog {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        if let Some(parent_id) = data.parent_id {
            tables.require_folder(parent_id)?;
        }
        tables.check_folder_paths(&data.location, &[])?;

        let now = Utc::now();
        let folder = Folder {
            id: FolderId::new(),
            name: data.name.clone(),
            storage_path: data.location.storage_path.clone(),
            virtual_path: data.location.virtual_path.clone(),
            creator_user_id: data.creator_user_id,
            parent_id: data.parent_id,
            access_url: None,
            is_published: data.is_published,
            created_at: now,
            updated_at: now,
        };
        tables.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        Ok(self.tables.read().await.folders.get(&id).cloned())
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<Folder>> {
        let tables = self.tables.read().await;
        Ok(tables
            .folders
            .values()
            .find(|f| f.virtual_path == virtual_path)
            .cloned())
    }

    async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<Folder>> {
        let tables = self.tables.read().await;
        let mut children: Vec<Folder> = tables
            .folders
            .values()
            .filter(|f| f.parent_id == parent_id)
            .cloned()
            .collect();
        by_name(&mut children, |f| (f.name.as_str(), f.id.to_string()));
        Ok(children)
    }

    async fn update(&self, id: FolderId, changes: &UpdateFolder) -> AppResult<Folder> {
        let mut tables = self.tables.write().await;
        let current = tables
            .folders
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        if let Some(Some(parent_id)) = changes.parent_id {
            tables.require_folder(parent_id)?;
        }

        let mut folder_moves: Vec<(FolderId, Location)> = Vec::new();
        let mut file_moves: Vec<(FileId, Location)> = Vec::new();

        if let Some(target) = &changes.location {
            let from = current.location();
            if *target != from {
                let subtree = tables.subtree(id);
                for folder_id in &subtree {
                    let Some(folder) = tables.folders.get(folder_id) else {
                        continue;
                    };
                    let location = if *folder_id == id {
                        target.clone()
                    } else {
                        rebased(&folder.location(), &from, target).ok_or_else(|| {
                            AppError::internal(format!(
                                "Folder '{}' is not beneath '{}'",
                                folder.virtual_path, from.virtual_path
                            ))
                        })?
                    };
                    tables.check_folder_paths(&location, &subtree)?;
                    folder_moves.push((*folder_id, location));
                }

                let moving_files: Vec<FileId> = tables
                    .files
                    .values()
                    .filter(|f| f.folder_id.is_some_and(|fid| subtree.contains(&fid)))
                    .map(|f| f.id)
                    .collect();
                for file_id in &moving_files {
                    let Some(file) = tables.files.get(file_id) else {
                        continue;
                    };
                    let location = rebased(&file.location(), &from, target).ok_or_else(|| {
                        AppError::internal(format!(
                            "File '{}' is not beneath '{}'",
                            file.virtual_path, from.virtual_path
                        ))
                    })?;
                    tables.check_file_paths(&location, &moving_files)?;
                    file_moves.push((*file_id, location));
                }
            }
        }

        let now = Utc::now();
        for (folder_id, location) in folder_moves {
            if let Some(folder) = tables.folders.get_mut(&folder_id) {
                folder.virtual_path = location.virtual_path;
                folder.storage_path = location.storage_path;
                folder.updated_at = now;
            }
        }
        for (file_id, location) in file_moves {
            if let Some(file) = tables.files.get_mut(&file_id) {
                file.virtual_path = location.virtual_path;
                file.storage_path = location.storage_path;
                file.updated_at = now;
            }
        }

        let folder = tables
            .folders
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;
        if let Some(name) = &changes.name {
            folder.name = name.clone();
        }
        if let Some(parent_id) = changes.parent_id {
            folder.parent_id = parent_id;
        }
        if let Some(is_published) = changes.is_published {
            folder.is_published = is_published;
        }
        folder.updated_at = now;
        Ok(folder.clone())
    }

    async fn delete(&self, id: FolderId) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.require_folder(id)?;

        let subtree = tables.subtree(id);
        tables.archives.retain(|_, a| !subtree.contains(&a.folder_id));
        tables
            .files
            .retain(|_, f| !f.folder_id.is_some_and(|fid| subtree.contains(&fid)));
        for folder_id in subtree.iter().rev() {
            tables.folders.remove(folder_id);
        }
        Ok(())
    }
}

#[async_trait]
impl FileCatalog for MemoryCatalog {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        if let Some(folder_id) = data.folder_id {
            tables.require_folder(folder_id)?;
        }
        if tables.files.contains_key(&data.id) {
            return Err(AppError::conflict(format!("File {} already exists", data.id)));
        }
        tables.check_file_paths(&data.location, &[])?;

        let now = Utc::now();
        let file = File {
            id: data.id,
            name: data.name.clone(),
            storage_path: data.location.storage_path.clone(),
            virtual_path: data.location.virtual_path.clone(),
            uploader_user_id: data.uploader_user_id,
            size_bytes: data.size_bytes,
            mime_type: data.mime_type.clone(),
            folder_id: data.folder_id,
            access_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.files.insert(file.id, file.clone());
        Ok(file)
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<File>> {
        let tables = self.tables.read().await;
        Ok(tables
            .files
            .values()
            .find(|f| f.virtual_path == virtual_path)
            .cloned())
    }

    async fn list_by_folder(&self, folder_id: Option<FolderId>) -> AppResult<Vec<File>> {
        let tables = self.tables.read().await;
        let mut files: Vec<File> = tables
            .files
            .values()
            .filter(|f| f.folder_id == folder_id)
            .cloned()
            .collect();
        by_name(&mut files, |f| (f.name.as_str(), f.id.to_string()));
        Ok(files)
    }

    async fn update(&self, id: FileId, changes: &UpdateFile) -> AppResult<File> {
        let mut tables = self.tables.write().await;
        if !tables.files.contains_key(&id) {
            return Err(AppError::not_found(format!("File {id} not found")));
        }
        if let Some(Some(folder_id)) = changes.folder_id {
            tables.require_folder(folder_id)?;
        }
        if let Some(location) = &changes.location {
            tables.check_file_paths(location, &[id])?;
        }

        let file = tables
            .files
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))?;
        if let Some(name) = &changes.name {
            file.name = name.clone();
        }
        if let Some(folder_id) = changes.folder_id {
            file.folder_id = folder_id;
        }
        if let Some(location) = &changes.location {
            file.virtual_path = location.virtual_path.clone();
            file.storage_path = location.storage_path.clone();
        }
        file.updated_at = Utc::now();
        Ok(file.clone())
    }

    async fn delete(&self, id: FileId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .files
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }
}

#[async_trait]
impl ArchiveCatalog for MemoryCatalog {
    async fn create(&self, data: &CreateArchive) -> AppResult<ResourceArchive> {
        let mut tables = self.tables.write().await;
        tables.require_folder(data.folder_id)?;

        let now = Utc::now();
        let archive = ResourceArchive {
            id: ArchiveId::new(),
            archive_path: data.archive_path.clone(),
            size: data.size,
            file_count: data.file_count,
            folder_id: data.folder_id,
            created_at: now,
            updated_at: now,
        };
        tables.archives.insert(archive.id, archive.clone());
        Ok(archive)
    }

    async fn list_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<ResourceArchive>> {
        let tables = self.tables.read().await;
        let mut archives: Vec<ResourceArchive> = tables
            .archives
            .values()
            .filter(|a| a.folder_id == folder_id)
            .cloned()
            .collect();
        archives.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(archives)
    }

    async fn delete(&self, id: ArchiveId) -> AppResult<()> {
        self.tables
            .write()
            .await
            .archives
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Archive {id} not found")))
    }
}
