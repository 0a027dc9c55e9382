//! Resource archive handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use vstore_core::types::{ArchiveId, FolderId};
use vstore_entity::CreateArchive;

use crate::dto::request::{CreateArchiveRequest, validated};
use crate::dto::response::{ApiResponse, ArchiveResponse, views};
use crate::error::ApiResult;
use crate::state::AppState;

/// GET /api/folders/{id}/archives
pub async fn list_archives(
    State(state): State<AppState>,
    Path(folder_id): Path<FolderId>,
) -> ApiResult<Json<ApiResponse<Vec<ArchiveResponse>>>> {
    let archives = state.archive_service.list(folder_id).await?;
    Ok(Json(ApiResponse::ok(views(archives))))
}

/// POST /api/folders/{id}/archives
pub async fn record_archive(
    State(state): State<AppState>,
    Path(folder_id): Path<FolderId>,
    Json(req): Json<CreateArchiveRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ArchiveResponse>>)> {
    let req = validated(req)?;
    let archive = state
        .archive_service
        .record(CreateArchive {
            folder_id,
            archive_path: req.archive_path,
            size: req.size,
            file_count: req.file_count,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(archive.into()))))
}

/// DELETE /api/archives/{id}
pub async fn delete_archive(
    State(state): State<AppState>,
    Path(id): Path<ArchiveId>,
) -> ApiResult<StatusCode> {
    state.archive_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
