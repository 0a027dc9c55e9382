//! PostgreSQL repository implementations of the catalog traits.

pub mod archive;
pub mod file;
pub mod folder;

pub use archive::ArchiveRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;

use vstore_core::error::{AppError, ErrorKind};

/// Map an insert/update failure onto the catalog error contract.
///
/// Unique violations on `virtual_path`/`storage_path` become `Conflict`,
/// a dangling folder reference becomes `NotFound`.
pub(crate) fn write_error(err: sqlx::Error, entity: &str, virtual_path: &str) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::conflict(format!(
                "{entity} '{virtual_path}' already exists ({})",
                db_err.constraint().unwrap_or("unique constraint")
            ))
        }
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            AppError::not_found(format!(
                "Folder referenced by {} '{virtual_path}' not found",
                entity.to_lowercase()
            ))
        }
        _ => AppError::with_source(ErrorKind::Database, format!("Failed to write {entity}"), err),
    }
}
