//! Request DTOs with validation.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use vstore_core::error::AppError;
use vstore_core::types::{FolderId, UserId};

/// Deserialize a field that is present (possibly `null`) as `Some`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`, so
/// `Option<Option<T>>` can tell "leave alone" from "set to null".
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn default_true() -> bool {
    true
}

/// Run `validator` rules and turn failures into a validation error.
pub fn validated<T: Validate>(body: T) -> Result<T, AppError> {
    body.validate()
        .map_err(|e| AppError::validation(format!("Invalid request: {e}")))?;
    Ok(body)
}

/// Create folder request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateFolderRequest {
    /// Folder name.
    #[validate(length(min = 1, max = 100, message = "Folder name must be 1-100 characters"))]
    pub name: String,
    /// Parent folder (root-level when absent).
    #[serde(default)]
    pub parent_id: Option<FolderId>,
    /// The creating user.
    pub creator_user_id: UserId,
    /// Publication flag.
    #[serde(default = "default_true")]
    pub is_published: bool,
}

/// Update folder request body. Every field is optional; `parent_id: null`
/// moves the folder to the root level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFolderRequest {
    /// New name.
    #[validate(length(min = 1, max = 100, message = "Folder name must be 1-100 characters"))]
    pub name: Option<String>,
    /// New parent.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub parent_id: Option<Option<FolderId>>,
    /// New publication flag.
    pub is_published: Option<bool>,
}

/// Update file request body. `folder_id: null` moves the file to the root
/// level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateFileRequest {
    /// New display name.
    #[validate(length(min = 3, max = 100, message = "File name must be 3-100 characters"))]
    pub name: Option<String>,
    /// New containing folder.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub folder_id: Option<Option<FolderId>>,
}

/// Record archive request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateArchiveRequest {
    /// Where the archive was written.
    #[validate(length(min = 1, message = "archive_path is required"))]
    pub archive_path: String,
    /// Size in bytes.
    #[validate(range(min = 0))]
    pub size: i64,
    /// Number of bundled files.
    #[validate(range(min = 0))]
    pub file_count: i32,
}

/// `?parent_id=` on folder listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderListQuery {
    /// Parent folder; root-level when absent.
    pub parent_id: Option<FolderId>,
}

/// `?folder_id=` or `?folder_path=` on file listings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileListQuery {
    /// Folder by id.
    pub folder_id: Option<FolderId>,
    /// Folder by virtual path.
    pub folder_path: Option<String>,
}

/// `?path=` on by-path lookups.
#[derive(Debug, Clone, Deserialize)]
pub struct PathQuery {
    /// A virtual path.
    pub path: String,
}
