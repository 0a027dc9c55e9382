//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vstore_core::types::{FolderId, UserId};

use crate::location::Location;

/// A folder in the virtual tree, mirrored by a directory on disk.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// Folder name (the last segment of `virtual_path`).
    pub name: String,
    /// Physical directory under the storage root.
    pub storage_path: String,
    /// Public path, always starting and ending with `/`.
    pub virtual_path: String,
    /// The user who created the folder.
    pub creator_user_id: UserId,
    /// Parent folder ID (null for root-level folders).
    pub parent_id: Option<FolderId>,
    /// Externally reachable URL, if one has been published.
    pub access_url: Option<String>,
    /// Whether the folder is visible to consumers.
    pub is_published: bool,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Check if this is a root-level folder (no parent).
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Both paths as one value.
    pub fn location(&self) -> Location {
        Location::new(self.virtual_path.clone(), self.storage_path.clone())
    }
}

/// Data required to create a new folder. The catalog assigns the id and
/// timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateFolder {
    /// Folder name.
    pub name: String,
    /// Parent folder (None for root-level).
    pub parent_id: Option<FolderId>,
    /// Computed virtual and storage paths.
    pub location: Location,
    /// The creating user.
    pub creator_user_id: UserId,
    /// Initial publication flag.
    pub is_published: bool,
}

/// Partial folder update. Only `Some` fields are applied.
///
/// `parent_id` is tri-state: `None` keeps the parent, `Some(None)` makes
/// the folder root-level, `Some(Some(id))` re-parents it. When `location`
/// is set, the catalog rewrites the paths of every descendant folder and
/// file in the same transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFolder {
    /// New name.
    pub name: Option<String>,
    /// New parent.
    pub parent_id: Option<Option<FolderId>>,
    /// New publication flag.
    pub is_published: Option<bool>,
    /// New paths.
    pub location: Option<Location>,
}

impl UpdateFolder {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.parent_id.is_none()
            && self.is_published.is_none()
            && self.location.is_none()
    }
}
