//! Disk store trait for the physical side of the virtual tree.

use std::path::Path;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream used for uploads and downloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Filesystem primitives the coordinators drive.
///
/// All paths are absolute physical paths produced by
/// [`PathTranslator`](crate::paths::PathTranslator). Implementations must
/// refuse paths outside their root with a validation error and must not
/// block the async runtime.
#[async_trait]
pub trait DiskStore: Send + Sync + std::fmt::Debug + 'static {
    /// The storage root every path must live under.
    fn root(&self) -> &Path;

    /// Check that the root is present and is a directory.
    async fn health_check(&self) -> AppResult<bool>;

    /// Whether anything exists at `path`.
    async fn exists(&self, path: &Path) -> AppResult<bool>;

    /// Create `path` and any missing ancestors.
    ///
    /// Fails with `Conflict` if the leaf already exists.
    async fn create_directory(&self, path: &Path) -> AppResult<()>;

    /// Recursively delete a directory. Missing paths are a no-op.
    async fn remove_tree(&self, path: &Path) -> AppResult<()>;

    /// Delete a single file. Missing paths are a no-op.
    async fn remove_file(&self, path: &Path) -> AppResult<()>;

    /// Rename a file or directory, creating missing ancestors of `to`.
    ///
    /// Fails with `NotFound` if `from` is missing and `Conflict` if `to`
    /// already exists.
    async fn rename_or_move(&self, from: &Path, to: &Path) -> AppResult<()>;

    /// Write a stream to `path` (truncating), returning the bytes written.
    async fn write_stream(&self, path: &Path, stream: ByteStream) -> AppResult<u64>;

    /// Open a file for streaming reads.
    async fn read_stream(&self, path: &Path) -> AppResult<ByteStream>;

    /// Size in bytes of the file at `path`.
    async fn stat_size(&self, path: &Path) -> AppResult<u64>;

    /// Content type of the file at `path`.
    async fn detect_mime_type(&self, path: &Path) -> AppResult<String>;
}
