//! Test fixtures: a temp storage root, an in-memory catalog that can be
//! told to fail, and the coordinators wired over both.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream;
use tempfile::TempDir;

use vstore_core::error::AppError;
use vstore_core::paths::PathTranslator;
use vstore_core::result::AppResult;
use vstore_core::traits::storage::{ByteStream, DiskStore};
use vstore_core::types::{ArchiveId, FileId, FolderId, UserId};
use vstore_database::catalog::{ArchiveCatalog, FileCatalog, FolderCatalog};
use vstore_database::memory::MemoryCatalog;
use vstore_entity::{
    CreateArchive, CreateFile, CreateFolder, File, Folder, ResourceArchive, UpdateFile,
    UpdateFolder,
};
use vstore_storage::LocalDiskStore;

use crate::{ArchiveService, CreateFolderRequest, FileService, FolderService, PathLocks};

/// Catalog wrapper whose writes can be made to fail on demand.
#[derive(Debug, Default)]
pub(crate) struct FlakyCatalog {
    pub inner: MemoryCatalog,
    pub fail_folder_create: AtomicBool,
    pub fail_folder_update: AtomicBool,
    pub fail_folder_delete: AtomicBool,
    pub fail_file_create: AtomicBool,
    pub fail_file_update: AtomicBool,
    /// Folder path probes report nothing, so only the uniqueness check in
    /// `create` can catch a duplicate.
    pub blind_folder_probe: AtomicBool,
}

fn tripped(flag: &AtomicBool) -> AppResult<()> {
    if flag.load(Ordering::SeqCst) {
        Err(AppError::database("injected catalog fault"))
    } else {
        Ok(())
    }
}

#[async_trait]
impl FolderCatalog for FlakyCatalog {
    async fn create(&self, data: &CreateFolder) -> AppResult<Folder> {
        tripped(&self.fail_folder_create)?;
        FolderCatalog::create(&self.inner, data).await
    }

    async fn find_by_id(&self, id: FolderId) -> AppResult<Option<Folder>> {
        FolderCatalog::find_by_id(&self.inner, id).await
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<Folder>> {
        if self.blind_folder_probe.load(Ordering::SeqCst) {
            return Ok(None);
        }
        FolderCatalog::find_by_virtual_path(&self.inner, virtual_path).await
    }

    async fn list_children(&self, parent_id: Option<FolderId>) -> AppResult<Vec<Folder>> {
        self.inner.list_children(parent_id).await
    }

    async fn update(&self, id: FolderId, changes: &UpdateFolder) -> AppResult<Folder> {
        tripped(&self.fail_folder_update)?;
        FolderCatalog::update(&self.inner, id, changes).await
    }

    async fn delete(&self, id: FolderId) -> AppResult<()> {
        tripped(&self.fail_folder_delete)?;
        FolderCatalog::delete(&self.inner, id).await
    }
}

#[async_trait]
impl FileCatalog for FlakyCatalog {
    async fn create(&self, data: &CreateFile) -> AppResult<File> {
        tripped(&self.fail_file_create)?;
        FileCatalog::create(&self.inner, data).await
    }

    async fn find_by_id(&self, id: FileId) -> AppResult<Option<File>> {
        FileCatalog::find_by_id(&self.inner, id).await
    }

    async fn find_by_virtual_path(&self, virtual_path: &str) -> AppResult<Option<File>> {
        FileCatalog::find_by_virtual_path(&self.inner, virtual_path).await
    }

    async fn list_by_folder(&self, folder_id: Option<FolderId>) -> AppResult<Vec<File>> {
        FileCatalog::list_by_folder(&self.inner, folder_id).await
    }

    async fn update(&self, id: FileId, changes: &UpdateFile) -> AppResult<File> {
        tripped(&self.fail_file_update)?;
        FileCatalog::update(&self.inner, id, changes).await
    }

    async fn delete(&self, id: FileId) -> AppResult<()> {
        FileCatalog::delete(&self.inner, id).await
    }
}

#[async_trait]
impl ArchiveCatalog for FlakyCatalog {
    async fn create(&self, data: &CreateArchive) -> AppResult<ResourceArchive> {
        ArchiveCatalog::create(&self.inner, data).await
    }

    async fn list_by_folder(&self, folder_id: FolderId) -> AppResult<Vec<ResourceArchive>> {
        ArchiveCatalog::list_by_folder(&self.inner, folder_id).await
    }

    async fn delete(&self, id: ArchiveId) -> AppResult<()> {
        ArchiveCatalog::delete(&self.inner, id).await
    }
}

/// Coordinators over a temp directory and a [`FlakyCatalog`].
pub(crate) struct Harness {
    pub _dir: TempDir,
    pub catalog: Arc<FlakyCatalog>,
    pub paths: PathTranslator,
    pub folders: FolderService,
    pub files: FileService,
    pub archives: ArchiveService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_options("/", None).await
    }

    pub async fn with_options(virtual_base: &str, allowed: Option<Vec<String>>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("storage");
        let disk = Arc::new(LocalDiskStore::new(root).await.unwrap());
        let paths = PathTranslator::new(disk.root(), virtual_base);
        let catalog = Arc::new(FlakyCatalog::default());
        let locks = PathLocks::new();

        let folders = FolderService::new(
            catalog.clone(),
            catalog.clone(),
            disk.clone(),
            paths.clone(),
            locks.clone(),
        );
        let files = FileService::new(
            catalog.clone(),
            catalog.clone(),
            disk,
            paths.clone(),
            locks,
            allowed,
        );
        let archives = ArchiveService::new(catalog.clone(), catalog.clone());

        Self {
            _dir: dir,
            catalog,
            paths,
            folders,
            files,
            archives,
        }
    }

    /// Create a folder through the coordinator.
    pub async fn folder(&self, name: &str, parent: Option<&Folder>) -> Folder {
        self.folders
            .create(CreateFolderRequest {
                name: name.to_string(),
                parent_id: parent.map(|p| p.id),
                creator_user_id: UserId::new(),
                is_published: true,
            })
            .await
            .unwrap()
    }

    /// Whether the physical counterpart of a virtual path exists.
    pub fn on_disk(&self, virtual_path: &str) -> bool {
        self.paths.to_physical(virtual_path).exists()
    }
}

/// A request body made of the given chunks.
pub(crate) fn body(chunks: &[&'static [u8]]) -> ByteStream {
    let items: Vec<Result<Bytes, std::io::Error>> =
        chunks.iter().map(|c| Ok(Bytes::from_static(c))).collect();
    Box::pin(stream::iter(items))
}

/// Drain a stream into memory.
pub(crate) async fn read_all(mut stream: ByteStream) -> Vec<u8> {
    let mut out = Vec::new();
    while let Some(chunk) = stream.next().await {
        out.extend_from_slice(&chunk.unwrap());
    }
    out
}
