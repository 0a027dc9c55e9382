//! File repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use vstore_core::error::{AppError, ErrorKind};
use vstore_core::result::AppResult;
use vstore_core::types::{FileId, FolderId};
use vstore_entity::{CreateFile, File, UpdateFile};

use super::write_error;
use crate::catalog::FileCatalog;

/// PostgreSQL-backed file rows.
#[derive(Debug, Clone)]
pub struct FileRepository {
    pool: PgPool,
}

impl FileRepository {
    /// Create a new file repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileCatalog for FileRepository {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        sqlx::query_as::<_, File>(
            "INSERT INTO files \
                (id, name, storage_path, virtual_path, uploader_user_id, size_bytes, mime_type, folder_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(data.id)
        .bind(&data.name)
        .bind(&data.location.storage_path)
        .bind(&data.location.virtual_path)
        .bind(data.uploader_user_id)
        .bind(data.size_bytes)
        .bind(&data.mime_type)
        .bind(data.folder_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "File", &data.location.virtual_path))
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find file", e))
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<File>> {
        sqlx::query_as::<_, File>("SELECT * FROM files WHERE virtual_path = $1")
            .bind(virtual_path)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find file by path", e)
            })
    }

    async fn list_by_folder(&self, folder_id: Option<FolderId>) -> AppResult<Vec<File>> {
        sqlx::query_as::<_, File>(
            "SELECT * FROM files WHERE folder_id IS NOT DISTINCT FROM $1 \
             ORDER BY name ASC, id ASC",
        )
        .bind(folder_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list files", e))
    }

    async fn update(&self, id: FileId, changes: &UpdateFile) -> AppResult<File> {
        let target = changes
            .location
            .as_ref()
            .map(|l| l.virtual_path.clone())
            .unwrap_or_else(|| id.to_string());

        sqlx::query_as::<_, File>(
            "UPDATE files SET \
                name = COALESCE($2, name), \
                folder_id = CASE WHEN $3 THEN $4 ELSE folder_id END, \
                virtual_path = COALESCE($5, virtual_path), \
                storage_path = COALESCE($6, storage_path), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.folder_id.is_some())
        .bind(changes.folder_id.flatten())
        .bind(changes.location.as_ref().map(|l| l.virtual_path.as_str()))
        .bind(changes.location.as_ref().map(|l| l.storage_path.as_str()))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| write_error(e, "File", &target))?
        .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    async fn delete(&self, id: FileId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete file", e))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("File {id} not found")));
        }
        Ok(())
    }
}
