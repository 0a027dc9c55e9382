//! Folder repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use vstore_core::error::{AppError, ErrorKind};
use vstore_core::result::AppResult;
use vstore_core::types::FolderId;
use vstore_entity::{CreateFolder, Folder, UpdateFolder};

use super::write_error;
use crate::catalog::FolderCatalog;

/// PostgreSQL-backed folder rows.
#[derive(Debug, Clone)]
pub struct FolderRepository {
    pool: PgPool,
}

impl FolderRepository {
    /// Create a new folder repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn db_error(message: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, message, e)
}

#[async_trait]
impl FolderCatalog for FolderRepository {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        sqlx::query_as::<_, Folder>(
            "INSERT INTO folders \
                (name, storage_path, virtual_path, creator_user_id, parent_id, is_published) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(&data.name)
        .bind(&data.location.storage_path)
        .bind(&data.location.virtual_path)
        .bind(data.creator_user_id)
        .bind(data.parent_id)
        .bind(data.is_published)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, "Folder", &data.location.virtual_path))
    }

    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder"))
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<Folder>> {
        sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE virtual_path = $1")
            .bind(virtual_path)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find folder by path"))
    }

    async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<Folder>> {
        sqlx::query_as::<_, Folder>(
            "SELECT * FROM folders WHERE parent_id IS NOT DISTINCT FROM $1 \
             ORDER BY name ASC, id ASC",
        )
        .bind(parent_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list child folders"))
    }

    async fn update(&self, id: FolderId, changes: &UpdateFolder) -> AppResult<Folder> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let current = sqlx::query_as::<_, Folder>("SELECT * FROM folders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error("Failed to lock folder"))?
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))?;

        let target_path = changes
            .location
            .as_ref()
            .map(|l| l.virtual_path.as_str())
            .unwrap_or(&current.virtual_path)
            .to_string();

        if let Some(location) = changes
            .location
            .as_ref()
            .filter(|l| l.virtual_path != current.virtual_path)
        {
            // Descendants first; the folder row itself is excluded by id.
            let folders = sqlx::query(
                "UPDATE folders SET \
                    virtual_path = $2 || substr(virtual_path, char_length($1) + 1), \
                    storage_path = $4 || substr(storage_path, char_length($3) + 1), \
                    updated_at = NOW() \
                 WHERE id <> $5 AND left(virtual_path, char_length($1)) = $1",
            )
            .bind(&current.virtual_path)
            .bind(&location.virtual_path)
            .bind(&current.storage_path)
            .bind(&location.storage_path)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "Folder", &location.virtual_path))?;

            let files = sqlx::query(
                "UPDATE files SET \
                    virtual_path = $2 || substr(virtual_path, char_length($1) + 1), \
                    storage_path = $4 || substr(storage_path, char_length($3) + 1), \
                    updated_at = NOW() \
                 WHERE left(virtual_path, char_length($1)) = $1",
            )
            .bind(&current.virtual_path)
            .bind(&location.virtual_path)
            .bind(&current.storage_path)
            .bind(&location.storage_path)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "File", &location.virtual_path))?;

            debug!(
                folder_id = %id,
                from = %current.virtual_path,
                to = %location.virtual_path,
                folders = folders.rows_affected(),
                files = files.rows_affected(),
                "Rebased descendant paths"
            );
        }

        let updated = sqlx::query_as::<_, Folder>(
            "UPDATE folders SET \
                name = COALESCE($2, name), \
                parent_id = CASE WHEN $3 THEN $4 ELSE parent_id END, \
                is_published = COALESCE($5, is_published), \
                virtual_path = COALESCE($6, virtual_path), \
                storage_path = COALESCE($7, storage_path), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.parent_id.is_some())
        .bind(changes.parent_id.flatten())
        .bind(changes.is_published)
        .bind(changes.location.as_ref().map(|l| l.virtual_path.as_str()))
        .bind(changes.location.as_ref().map(|l| l.storage_path.as_str()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| write_error(e, "Folder", &target_path))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder update"))?;

        Ok(updated)
    }

    async fn delete(&self, id: FolderId) -> AppResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let subtree: Vec<Uuid> = sqlx::query_scalar(
            "WITH RECURSIVE tree AS ( \
                SELECT id FROM folders WHERE id = $1 \
                UNION ALL \
                SELECT f.id FROM folders f INNER JOIN tree t ON f.parent_id = t.id \
             ) SELECT id FROM tree",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await
        .map_err(db_error("Failed to collect folder subtree"))?;

        if subtree.is_empty() {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }

        sqlx::query("DELETE FROM resource_archives WHERE folder_id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete archive records"))?;

        let files = sqlx::query("DELETE FROM files WHERE folder_id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete files"))?;

        sqlx::query("DELETE FROM folders WHERE id = ANY($1)")
            .bind(&subtree)
            .execute(&mut *tx)
            .await
            .map_err(db_error("Failed to delete folders"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit folder delete"))?;

        debug!(
            folder_id = %id,
            folders = subtree.len(),
            files = files.rows_affected(),
            "Deleted folder subtree"
        );
        Ok(())
    }
}
