//! Compensation for a disk step whose catalog step failed.

use std::future::Future;
use std::path::Path;

use tracing::{error, warn};

use vstore_core::error::AppError;
use vstore_core::result::AppResult;

/// Run `undo` after the catalog rejected `operation`, then hand back the
/// catalog error. A failed undo is logged with the orphaned path.
pub(crate) async fn compensate<F>(
    operation: &str,
    orphan: &Path,
    cause: AppError,
    undo: F,
) -> AppError
where
    F: Future<Output = AppResult<()>>,
{
    warn!(
        operation,
        path = %orphan.display(),
        error = %cause,
        "Catalog step failed, reverting disk change"
    );
    if let Err(undo_err) = undo.await {
        error!(
            operation,
            path = %orphan.display(),
            error = %undo_err,
            "Failed to revert disk change, path is orphaned"
        );
    }
    cause
}
