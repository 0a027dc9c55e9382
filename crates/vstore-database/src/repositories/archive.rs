//! Resource archive repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use vstore_core::error::{AppError, ErrorKind};
use vstore_core::result::AppResult;
use vstore_core::types::{ArchiveId, FolderId};
use vstore_entity::{CreateArchive, ResourceArchive};

use super::write_error;
use crate::catalog::ArchiveCatalog;

/// PostgreSQL-backed archive records.
#[derive(Debug, Clone)]
pub struct ArchiveRepository {
    pool: PgPool,
}

impl ArchiveRepository {
    /// Create a new archive repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArchiveCatalog for ArchiveRepository {
    async fn create(&self, data: &CreateArchive) -> AppResult<ResourceArchive> {
        sqlx::query_as::<_, ResourceArchive>(
            "INSERT INTO resource_archives (archive_path, size, file_count, folder_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&data.archive_path)
        .bind(data.size)
        .bind(data.file_count)
        .bind(data.folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Archive", &data.archive_path))
    }

    async fn list_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<ResourceArchive>> {
        sqlx::query_as::<_, ResourceArchive>(
            "SELECT * FROM resource_archives WHERE folder_id = $1 \
             ORDER BY created_at DESC, id ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list archives", e))
    }

    async fn delete(&self, id: ArchiveId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM resource_archives WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to delete archive", e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Archive {id} not found")));
        }
        Ok(())
    }
}
