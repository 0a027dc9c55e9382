//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use vstore_core::config::AppConfig;
use vstore_core::paths::PathTranslator;
use vstore_core::traits::storage::DiskStore;
use vstore_database::catalog::Catalog;
use vstore_service::{ArchiveService, FileService, FolderService, Services};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Catalog repositories (PostgreSQL or in-memory)
    pub catalog: Catalog,
    /// Physical storage under the configured root
    pub disk: Arc<dyn DiskStore>,

    // ── Services ─────────────────────────────────────────────
    /// Folder coordinator
    pub folder_service: Arc<FolderService>,
    /// File coordinator
    pub file_service: Arc<FileService>,
    /// Archive records
    pub archive_service: Arc<ArchiveService>,
}

impl AppState {
    /// Wire the coordinators over a catalog and a disk store.
    pub fn new(config: AppConfig, catalog: Catalog, disk: Arc<dyn DiskStore>) -> Self {
        let paths = PathTranslator::new(disk.root(), &config.storage.virtual_base);
        let services = Services::new(
            &catalog,
            Arc::clone(&disk),
            paths,
            config.storage.allowed_extensions.clone(),
        );

        Self {
            config: Arc::new(config),
            catalog,
            disk,
            folder_service: Arc::new(services.folders),
            file_service: Arc::new(services.files),
            archive_service: Arc::new(services.archives),
        }
    }
}
