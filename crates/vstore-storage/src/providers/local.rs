//! Local filesystem disk store.

use std::io;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use vstore_core::error::{AppError, ErrorKind};
use vstore_core::result::AppResult;
use vstore_core::traits::storage::{ByteStream, DiskStore};

/// Disk store rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStore {
    /// Every path handled by this store lives under this directory.
    root: PathBuf,
}

impl LocalDiskStore {
    /// Create a store rooted at `root`, creating the directory if needed.
    ///
    /// The root is canonicalised, so a relative configuration value still
    /// yields absolute physical paths.
    pub async fn new(root: impl Into<PathBuf>) -> AppResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        let root = fs::canonicalize(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to resolve storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Reject paths that escape the root.
    fn confine(&self, path: &Path) -> AppResult<()> {
        let inside = path.strip_prefix(&self.root).is_ok_and(|rest| {
            rest.components().next().is_some()
                && rest.components().all(|c| matches!(c, Component::Normal(_)))
        });
        if !inside {
            return Err(AppError::validation(format!(
                "Path {} is outside the storage root",
                path.display()
            )));
        }
        Ok(())
    }

    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn io_error(action: &str, path: &Path, err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            AppError::not_found(format!("Path not found: {}", path.display()))
        }
        io::ErrorKind::AlreadyExists => {
            AppError::conflict(format!("Path already exists: {}", path.display()))
        }
        _ => AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to {action}: {}", path.display()),
            err,
        ),
    }
}

async fn path_exists(path: &Path) -> AppResult<bool> {
    fs::try_exists(path)
        .await
        .map_err(|e| io_error("stat", path, e))
}

#[async_trait]
impl DiskStore for LocalDiskStore {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn health_check(&self) -> AppResult<bool> {
        match fs::metadata(&self.root).await {
            Ok(meta) => Ok(meta.is_dir()),
            Err(_) => Ok(false),
        }
    }

    async fn exists(&self, path: &Path) -> AppResult<bool> {
        self.confine(path)?;
        path_exists(path).await
    }

    async fn create_directory(&self, path: &Path) -> AppResult<()> {
        self.confine(path)?;
        self.ensure_parent(path).await?;
        fs::create_dir(path)
            .await
            .map_err(|e| io_error("create directory", path, e))?;
        debug!(path = %path.display(), "Created directory");
        Ok(())
    }

    async fn remove_tree(&self, path: &Path) -> AppResult<()> {
        self.confine(path)?;
        match fs::remove_dir_all(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed directory tree");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove directory", path, e)),
        }
    }

    async fn remove_file(&self, path: &Path) -> AppResult<()> {
        self.confine(path)?;
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove file", path, e)),
        }
    }

    async fn rename_or_move(&self, from: &Path, to: &Path) -> AppResult<()> {
        self.confine(from)?;
        self.confine(to)?;

        if !path_exists(from).await? {
            return Err(AppError::not_found(format!(
                "Path not found: {}",
                from.display()
            )));
        }
        // rename(2) silently replaces an empty directory or a file.
        if path_exists(to).await? {
            return Err(AppError::conflict(format!(
                "Path already exists: {}",
                to.display()
            )));
        }

        self.ensure_parent(to).await?;
        fs::rename(from, to)
            .await
            .map_err(|e| io_error("rename", from, e))?;

        debug!(from = %from.display(), to = %to.display(), "Renamed path");
        Ok(())
    }

    async fn write_stream(&self, path: &Path, mut stream: ByteStream) -> AppResult<u64> {
        self.confine(path)?;
        self.ensure_parent(path).await?;

        let mut file = fs::File::create(path)
            .await
            .map_err(|e| io_error("create file", path, e))?;

        let mut total_bytes = 0u64;
        let outcome: AppResult<()> = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| {
                    AppError::with_source(ErrorKind::Storage, "Upload stream failed", e)
                })?;
                total_bytes += chunk.len() as u64;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| io_error("write", path, e))?;
            }
            file.flush().await.map_err(|e| io_error("flush", path, e))
        }
        .await;

        if let Err(err) = outcome {
            drop(file);
            if let Err(cleanup) = fs::remove_file(path).await {
                warn!(
                    path = %path.display(),
                    error = %cleanup,
                    "Failed to remove partial file"
                );
            }
            return Err(err);
        }

        debug!(path = %path.display(), bytes = total_bytes, "Wrote file from stream");
        Ok(total_bytes)
    }

    async fn read_stream(&self, path: &Path) -> AppResult<ByteStream> {
        self.confine(path)?;
        let meta = fs::metadata(path)
            .await
            .map_err(|e| io_error("open file", path, e))?;
        if !meta.is_file() {
            return Err(AppError::not_found(format!(
                "Not a file: {}",
                path.display()
            )));
        }

        let file = fs::File::open(path)
            .await
            .map_err(|e| io_error("open file", path, e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn stat_size(&self, path: &Path) -> AppResult<u64> {
        self.confine(path)?;
        let meta = fs::metadata(path)
            .await
            .map_err(|e| io_error("stat", path, e))?;
        Ok(meta.len())
    }

    async fn detect_mime_type(&self, path: &Path) -> AppResult<String> {
        self.confine(path)?;
        Ok(mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string())
    }
}
