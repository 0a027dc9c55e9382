//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use vstore_core::types::{ArchiveId, FileId, FolderId, UserId};
use vstore_entity::{File, Folder, ResourceArchive};
use vstore_service::FolderContents;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Public view of a folder. The physical path stays server-side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderResponse {
    /// Folder ID.
    pub id: FolderId,
    /// Display name.
    pub name: String,
    /// Virtual path, with a trailing separator.
    pub virtual_path: String,
    /// Parent folder.
    pub parent_id: Option<FolderId>,
    /// Creator.
    pub creator_user_id: UserId,
    /// Public URL, when one has been assigned.
    pub access_url: Option<String>,
    /// Publication flag.
    pub is_published: bool,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            virtual_path: folder.virtual_path,
            parent_id: folder.parent_id,
            creator_user_id: folder.creator_user_id,
            access_url: folder.access_url,
            is_published: folder.is_published,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

/// Public view of a file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileResponse {
    /// File ID.
    pub id: FileId,
    /// Display name.
    pub name: String,
    /// Virtual path (`<folder>/<id><ext>`).
    pub virtual_path: String,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
    /// Uploader.
    pub uploader_user_id: UserId,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: String,
    /// Public URL, when one has been assigned.
    pub access_url: Option<String>,
    /// Created at.
    pub created_at: DateTime<Utc>,
    /// Updated at.
    pub updated_at: DateTime<Utc>,
}

impl From<File> for FileResponse {
    fn from(file: File) -> Self {
        Self {
            id: file.id,
            name: file.name,
            virtual_path: file.virtual_path,
            folder_id: file.folder_id,
            uploader_user_id: file.uploader_user_id,
            size_bytes: file.size_bytes,
            mime_type: file.mime_type,
            access_url: file.access_url,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

/// Folders and files directly inside a folder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FolderContentsResponse {
    /// The folder itself; absent for the root level.
    pub folder: Option<FolderResponse>,
    /// Child folders.
    pub folders: Vec<FolderResponse>,
    /// Files.
    pub files: Vec<FileResponse>,
}

impl From<FolderContents> for FolderContentsResponse {
    fn from(contents: FolderContents) -> Self {
        Self {
            folder: contents.folder.map(FolderResponse::from),
            folders: contents.folders.into_iter().map(FolderResponse::from).collect(),
            files: contents.files.into_iter().map(FileResponse::from).collect(),
        }
    }
}

/// Archive record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveResponse {
    /// Archive ID.
    pub id: ArchiveId,
    /// Archived folder.
    pub folder_id: FolderId,
    /// Archive location.
    pub archive_path: String,
    /// Size in bytes.
    pub size: i64,
    /// Bundled file count.
    pub file_count: i32,
    /// Created at.
    pub created_at: DateTime<Utc>,
}

impl From<ResourceArchive> for ArchiveResponse {
    fn from(archive: ResourceArchive) -> Self {
        Self {
            id: archive.id,
            folder_id: archive.folder_id,
            archive_path: archive.archive_path,
            size: archive.size,
            file_count: archive.file_count,
            created_at: archive.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` when every dependency answers, `degraded` otherwise.
    pub status: String,
    /// Configured service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// `postgres` or `memory`.
    pub catalog: String,
    /// Catalog reachable.
    pub catalog_healthy: bool,
    /// Storage root reachable.
    pub storage_healthy: bool,
}

/// Convert a list of rows into views.
pub fn views<T, V: From<T>>(rows: Vec<T>) -> Vec<V> {
    rows.into_iter().map(V::from).collect()
}
