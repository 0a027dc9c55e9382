//! File entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vstore_core::paths::{SEPARATOR, extension_of};
use vstore_core::types::{FileId, FolderId, UserId};

use crate::location::Location;

/// A file body on disk plus its catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct File {
    /// Unique file identifier, also the stem of the on-disk name.
    pub id: FileId,
    /// Display name chosen by the uploader.
    pub name: String,
    /// Physical file under the storage root.
    pub storage_path: String,
    /// Public path: `folder.virtual_path + id + extension`.
    pub virtual_path: String,
    /// The uploading user.
    pub uploader_user_id: UserId,
    /// Size of the stored body in bytes.
    pub size_bytes: i64,
    /// Content type derived from the stored body.
    pub mime_type: String,
    /// Containing folder (null for root-level files).
    pub folder_id: Option<FolderId>,
    /// Externally reachable URL, if one has been published.
    pub access_url: Option<String>,
    /// When the file was uploaded.
    pub created_at: DateTime<Utc>,
    /// When the file was last updated.
    pub updated_at: DateTime<Utc>,
}

impl File {
    /// The on-disk file name (`<id><ext>`).
    pub fn stored_name(&self) -> &str {
        self.virtual_path
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or(&self.virtual_path)
    }

    /// Extension of the stored body (`.pdf`), fixed at upload time.
    pub fn extension(&self) -> String {
        extension_of(self.stored_name())
    }

    /// Both paths as one value.
    pub fn location(&self) -> Location {
        Location::new(self.virtual_path.clone(), self.storage_path.clone())
    }
}

/// Data required to record an uploaded file. The id is generated by the
/// caller before the body is written so disk and catalog agree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFile {
    /// Pre-generated identifier.
    pub id: FileId,
    /// Display name.
    pub name: String,
    /// Computed virtual and storage paths.
    pub location: Location,
    /// The uploading user.
    pub uploader_user_id: UserId,
    /// Bytes written to disk.
    pub size_bytes: i64,
    /// Detected content type.
    pub mime_type: String,
    /// Containing folder.
    pub folder_id: Option<FolderId>,
}

/// Partial file update. Only `Some` fields are applied; `folder_id` is
/// tri-state like [`UpdateFolder::parent_id`](crate::folder::UpdateFolder).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFile {
    /// New display name.
    pub name: Option<String>,
    /// New containing folder.
    pub folder_id: Option<Option<FolderId>>,
    /// New paths.
    pub location: Option<Location>,
}

impl UpdateFile {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.folder_id.is_none() && self.location.is_none()
    }
}
