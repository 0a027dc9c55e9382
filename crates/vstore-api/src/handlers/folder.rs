//! Folder handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

use vstore_core::types::FolderId;
use vstore_service::{
    CreateFolderRequest as SvcCreateFolder, UpdateFolderRequest as SvcUpdateFolder,
};

use crate::dto::request::{
    CreateFolderRequest, FolderListQuery, PathQuery, UpdateFolderRequest, validated,
};
use crate::dto::response::{ApiResponse, FolderContentsResponse, FolderResponse, views};
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/folders
pub async fn create_folder(
    State(state): State<AppState>,
    Json(req): Json<CreateFolderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<FolderResponse>>)> {
    let req = validated(req)?;
    let folder = state
        .folder_service
        .create(SvcCreateFolder {
            name: req.name,
            parent_id: req.parent_id,
            creator_user_id: req.creator_user_id,
            is_published: req.is_published,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(folder.into()))))
}

/// GET /api/folders?parent_id=...
pub async fn list_folders(
    State(state): State<AppState>,
    Query(query): Query<FolderListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FolderResponse>>>> {
    let folders = state.folder_service.list_children(query.parent_id).await?;
    Ok(Json(ApiResponse::ok(views(folders))))
}

/// GET /api/folders/by-path?path=...
pub async fn get_folder_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Json<ApiResponse<FolderResponse>>> {
    let folder = state.folder_service.get_by_virtual_path(&query.path).await?;
    Ok(Json(ApiResponse::ok(folder.into())))
}

/// GET /api/folders/{id}
pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<FolderId>,
) -> ApiResult<Json<ApiResponse<FolderResponse>>> {
    let folder = state.folder_service.get(id).await?;
    Ok(Json(ApiResponse::ok(folder.into())))
}

/// GET /api/folders/{id}/contents
pub async fn folder_contents(
    State(state): State<AppState>,
    Path(id): Path<FolderId>,
) -> ApiResult<Json<ApiResponse<FolderContentsResponse>>> {
    let contents = state.folder_service.contents(Some(id)).await?;
    Ok(Json(ApiResponse::ok(contents.into())))
}

/// PATCH /api/folders/{id}
pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<FolderId>,
    Json(req): Json<UpdateFolderRequest>,
) -> ApiResult<Json<ApiResponse<FolderResponse>>> {
    let req = validated(req)?;
    let folder = state
        .folder_service
        .update(
            id,
            SvcUpdateFolder {
                name: req.name,
                parent_id: req.parent_id,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(folder.into())))
}

/// DELETE /api/folders/{id}
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<FolderId>,
) -> ApiResult<StatusCode> {
    state.folder_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
