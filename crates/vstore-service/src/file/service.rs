//! File coordinator: uploads, relocations, deletes, and downloads.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use vstore_core::error::AppError;
use vstore_core::paths::{PathTranslator, extension_of, normalize_folder_path};
use vstore_core::result::AppResult;
use vstore_core::traits::storage::{ByteStream, DiskStore};
use vstore_core::types::{FileId, FolderId, UserId};
use vstore_core::validation::{validate_extension, validate_file_name};
use vstore_database::catalog::{FileCatalog, FolderCatalog};
use vstore_entity::{CreateFile, File, Folder, Location, UpdateFile};

use crate::locks::PathLocks;
use crate::undo::compensate;

/// Where an uploaded file goes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FolderTarget {
    /// The root level.
    Root,
    /// A folder by id.
    Id(FolderId),
    /// A folder by virtual path.
    Path(String),
}

/// Upload metadata; the body is passed separately as a stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFileRequest {
    /// Display name. Empty means "use the generated id".
    pub name: String,
    /// The uploading user.
    pub uploader_user_id: UserId,
    /// Destination folder.
    pub folder: FolderTarget,
}

/// Partial file update. `folder_id: Some(None)` moves the file to the root
/// level.
#[derive(Debug, Clone, Default)]
pub struct UpdateFileRequest {
    /// New display name.
    pub name: Option<String>,
    /// New containing folder.
    pub folder_id: Option<Option<FolderId>>,
}

/// A catalog row plus an open stream over its body.
pub struct Download {
    /// The file row.
    pub file: File,
    /// The body.
    pub stream: ByteStream,
}

/// Keeps file bodies on disk and file rows in the catalog in step.
#[derive(Debug, Clone)]
pub struct FileService {
    /// File rows.
    files: Arc<dyn FileCatalog>,
    /// Folder rows (for target resolution).
    folders: Arc<dyn FolderCatalog>,
    /// Physical tree.
    disk: Arc<dyn DiskStore>,
    /// Virtual to physical mapping.
    paths: PathTranslator,
    /// Per-path advisory locks shared with the folder coordinator.
    locks: PathLocks,
    /// Optional extension allow-list.
    allowed_extensions: Option<Vec<String>>,
}

impl FileService {
    /// Creates a new file service.
    pub fn new(
        files: Arc<dyn FileCatalog>,
        folders: Arc<dyn FolderCatalog>,
        disk: Arc<dyn DiskStore>,
        paths: PathTranslator,
        locks: PathLocks,
        allowed_extensions: Option<Vec<String>>,
    ) -> Self {
        Self {
            files,
            folders,
            disk,
            paths,
            locks,
            allowed_extensions,
        }
    }

    /// Gets a file by ID.
    pub async fn get(&self, id: FileId) -> AppResult<File> {
        self.files.get_by_id(id).await
    }

    /// Gets a file by virtual path.
    pub async fn get_by_virtual_path(&self, path: &str) -> AppResult<File> {
        self.files.get_by_virtual_path(path).await
    }

    /// Lists files directly inside a folder, or at the root level.
    pub async fn list(&self, folder_id: Option<FolderId>) -> AppResult<Vec<File>> {
        if let Some(id) = folder_id {
            self.folders.get_by_id(id).await?;
        }
        self.files.list_by_folder(folder_id).await
    }

    /// Lists files inside the folder at `path`. The virtual base lists the
    /// root level.
    pub async fn list_by_folder_path(&self, path: &str) -> AppResult<Vec<File>> {
        let path = normalize_folder_path(path);
        if path == self.paths.virtual_base() {
            return self.files.list_by_folder(None).await;
        }
        let folder = self.folders.get_by_virtual_path(&path).await?;
        self.files.list_by_folder(Some(folder.id)).await
    }

    /// Opens a file body for streaming.
    pub async fn open(&self, id: FileId) -> AppResult<Download> {
        let file = self.files.get_by_id(id).await?;
        self.open_row(file).await
    }

    /// Opens a file body by virtual path.
    pub async fn open_by_virtual_path(&self, path: &str) -> AppResult<Download> {
        let file = self.files.get_by_virtual_path(path).await?;
        self.open_row(file).await
    }

    async fn open_row(&self, file: File) -> AppResult<Download> {
        let stream = self
            .disk
            .read_stream(&self.paths.to_physical(&file.virtual_path))
            .await?;
        Ok(Download { file, stream })
    }

    /// Stores an uploaded body under a fresh id and records it.
    ///
    /// The on-disk name is the id plus the display name's extension. If the
    /// catalog insert fails the written body is removed.
    pub async fn upload(&self, req: UploadFileRequest, body: ByteStream) -> AppResult<File> {
        let id = FileId::new();
        let name = if req.name.trim().is_empty() {
            id.to_string()
        } else {
            req.name
        };
        validate_file_name(&name)?;
        validate_extension(&name, self.allowed_extensions.as_deref())?;

        let folder = self.resolve_target(&req.folder).await?;
        let virtual_path = self.paths.file_path(
            folder.as_ref().map(|f| f.virtual_path.as_str()),
            &id.to_string(),
            &extension_of(&name),
        );

        let _guard = self.locks.acquire(&[virtual_path.as_str()]).await;
        self.confirm_folder(folder.as_ref()).await?;

        let physical = self.paths.to_physical(&virtual_path);
        let written = self.disk.write_stream(&physical, body).await?;

        let measured = async {
            let size = self.disk.stat_size(&physical).await?;
            let mime = self.disk.detect_mime_type(&physical).await?;
            let size = i64::try_from(size)
                .map_err(|_| AppError::storage(format!("File size {size} out of range")))?;
            Ok::<_, AppError>((size, mime))
        }
        .await;

        let record = match measured {
            Ok((size_bytes, mime_type)) => CreateFile {
                id,
                name,
                location: Location::new(
                    virtual_path.clone(),
                    self.paths.storage_path(&virtual_path),
                ),
                uploader_user_id: req.uploader_user_id,
                size_bytes,
                mime_type,
                folder_id: folder.as_ref().map(|f| f.id),
            },
            Err(e) => {
                return Err(
                    compensate("upload_file", &physical, e, self.disk.remove_file(&physical))
                        .await,
                );
            }
        };

        let file = match self.files.create(&record).await {
            Ok(file) => file,
            Err(e) => {
                return Err(
                    compensate("upload_file", &physical, e, self.disk.remove_file(&physical))
                        .await,
                );
            }
        };

        info!(
            file_id = %file.id,
            virtual_path = %file.virtual_path,
            bytes = written,
            mime_type = %file.mime_type,
            "File uploaded"
        );
        Ok(file)
    }

    /// Renames a file and/or moves it to another folder.
    ///
    /// A rename only changes the display name; the body keeps its
    /// `id + extension` name. A folder change moves the body with an atomic
    /// rename and is reverted if the catalog update fails.
    pub async fn update(&self, id: FileId, req: UpdateFileRequest) -> AppResult<File> {
        if let Some(name) = &req.name {
            validate_file_name(name)?;
            validate_extension(name, self.allowed_extensions.as_deref())?;
        }

        let current = self.files.get_by_id(id).await?;

        let target_folder = match req.folder_id {
            Some(Some(folder_id)) => Some(self.folders.get_by_id(folder_id).await?),
            _ => None,
        };
        let target_path = match req.folder_id {
            Some(_) => self.paths.file_path(
                target_folder.as_ref().map(|f| f.virtual_path.as_str()),
                &id.to_string(),
                &current.extension(),
            ),
            None => current.virtual_path.clone(),
        };

        let changes = UpdateFile {
            name: req.name,
            folder_id: req.folder_id,
            location: None,
        };

        if target_path == current.virtual_path {
            let _guard = self.locks.acquire(&[current.virtual_path.as_str()]).await;
            self.confirm_unchanged(&current).await?;
            if changes.is_empty() {
                return Ok(current);
            }
            let file = self.files.update(id, &changes).await?;
            info!(file_id = %id, "File updated");
            return Ok(file);
        }

        let _guard = self
            .locks
            .acquire(&[current.virtual_path.as_str(), target_path.as_str()])
            .await;
        self.confirm_unchanged(&current).await?;
        self.confirm_folder(target_folder.as_ref()).await?;

        if self
            .files
            .find_by_virtual_path(&target_path)
            .await?
            .is_some()
        {
            return Err(AppError::conflict(format!(
                "File '{target_path}' already exists"
            )));
        }

        let from = self.paths.to_physical(&current.virtual_path);
        let to = self.paths.to_physical(&target_path);
        self.disk.rename_or_move(&from, &to).await?;

        let changes = UpdateFile {
            location: Some(Location::new(
                target_path.clone(),
                self.paths.storage_path(&target_path),
            )),
            ..changes
        };

        let file = match self.files.update(id, &changes).await {
            Ok(file) => file,
            Err(e) => {
                return Err(compensate(
                    "update_file",
                    &to,
                    e,
                    self.disk.rename_or_move(&to, &from),
                )
                .await);
            }
        };

        info!(
            file_id = %id,
            from = %current.virtual_path,
            to = %file.virtual_path,
            "File relocated"
        );
        Ok(file)
    }

    /// Deletes a file body and its row.
    pub async fn delete(&self, id: FileId) -> AppResult<()> {
        let file = self.files.get_by_id(id).await?;
        self.delete_row(file).await
    }

    /// Deletes the file at a virtual path.
    pub async fn delete_by_virtual_path(&self, path: &str) -> AppResult<()> {
        let file = self.files.get_by_virtual_path(path).await?;
        self.delete_row(file).await
    }

    async fn delete_row(&self, file: File) -> AppResult<()> {
        let _guard = self.locks.acquire(&[file.virtual_path.as_str()]).await;
        self.confirm_unchanged(&file).await?;

        let physical = self.paths.to_physical(&file.virtual_path);
        self.disk.remove_file(&physical).await?;

        if let Err(e) = self.files.delete(file.id).await {
            error!(
                file_id = %file.id,
                virtual_path = %file.virtual_path,
                error = %e,
                "File body removed but catalog row remains"
            );
            return Err(e);
        }

        info!(
            file_id = %file.id,
            virtual_path = %file.virtual_path,
            "File deleted"
        );
        Ok(())
    }

    async fn resolve_target(&self, target: &FolderTarget) -> AppResult<Option<Folder>> {
        match target {
            FolderTarget::Root => Ok(None),
            FolderTarget::Id(id) => Ok(Some(self.folders.get_by_id(*id).await?)),
            FolderTarget::Path(path) => {
                let path = normalize_folder_path(path);
                if path == self.paths.virtual_base() {
                    return Ok(None);
                }
                Ok(Some(self.folders.get_by_virtual_path(&path).await?))
            }
        }
    }

    async fn confirm_unchanged(&self, expected: &File) -> AppResult<()> {
        let fresh = self.files.get_by_id(expected.id).await?;
        if fresh.virtual_path != expected.virtual_path {
            return Err(AppError::conflict(format!(
                "File {} was moved concurrently",
                expected.id
            )));
        }
        Ok(())
    }

    /// The target folder must still exist at the path the file path was
    /// computed from.
    async fn confirm_folder(&self, folder: Option<&Folder>) -> AppResult<()> {
        let Some(folder) = folder else {
            return Ok(());
        };
        let fresh = self.folders.get_by_id(folder.id).await?;
        if fresh.virtual_path != folder.virtual_path {
            return Err(AppError::conflict(format!(
                "Folder {} was moved concurrently",
                folder.id
            )));
        }
        Ok(())
    }
}
