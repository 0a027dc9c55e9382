//! Resource archive model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use vstore_core::types::{ArchiveId, FolderId};

/// A record that a folder was bundled into an archive file.
///
/// Purely a catalog row; the archive itself is managed elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResourceArchive {
    /// Unique archive identifier.
    pub id: ArchiveId,
    /// Where the archive file was written.
    pub archive_path: String,
    /// Archive size in bytes.
    pub size: i64,
    /// Number of files bundled.
    pub file_count: i32,
    /// The archived folder.
    pub folder_id: FolderId,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Data required to record an archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateArchive {
    /// The archived folder.
    pub folder_id: FolderId,
    /// Where the archive file was written.
    pub archive_path: String,
    /// Archive size in bytes.
    pub size: i64,
    /// Number of files bundled.
    pub file_count: i32,
}
