//! File handlers: upload, listing, download, rename/move, delete.

use std::io;

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures::SinkExt;
use futures::channel::mpsc;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use vstore_core::error::AppError;
use vstore_core::traits::storage::ByteStream;
use vstore_core::types::{FileId, FolderId, UserId};
use vstore_service::{
    Download, FolderTarget, UpdateFileRequest as SvcUpdateFile, UploadFileRequest,
};

use crate::dto::request::{FileListQuery, PathQuery, UpdateFileRequest, validated};
use crate::dto::response::{ApiResponse, FileResponse, views};
use crate::error::ApiResult;
use crate::state::AppState;

/// Chunks buffered between the multipart reader and the disk writer.
const UPLOAD_BUFFER: usize = 8;

/// POST /api/files (multipart)
///
/// Fields: `file` (required), `uploader_user_id` (required), `name`,
/// and at most one of `folder_id` / `folder_path`. The `file` part must
/// come last; its body is streamed to storage as it arrives.
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ApiResponse<FileResponse>>)> {
    let mut uploader: Option<UserId> = None;
    let mut name: Option<String> = None;
    let mut folder_id: Option<FolderId> = None;
    let mut folder_path: Option<String> = None;
    let mut stored = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();
        match field_name.as_str() {
            "file" => {
                let uploader_user_id = uploader.ok_or_else(|| {
                    AppError::validation("uploader_user_id is required before the file part")
                })?;
                let request = UploadFileRequest {
                    name: name
                        .take()
                        .or_else(|| field.file_name().map(String::from))
                        .unwrap_or_default(),
                    uploader_user_id,
                    folder: folder_target(folder_id, folder_path.take())?,
                };

                let (mut tx, rx) = mpsc::channel::<Result<Bytes, io::Error>>(UPLOAD_BUFFER);
                let pump = async move {
                    loop {
                        match field.chunk().await {
                            Ok(Some(chunk)) => {
                                if tx.send(Ok(chunk)).await.is_err() {
                                    return Ok::<(), AppError>(());
                                }
                            }
                            Ok(None) => return Ok(()),
                            Err(e) => {
                                let message = format!("Read error: {e}");
                                let _ = tx.send(Err(io::Error::other(message.clone()))).await;
                                return Err(AppError::validation(message));
                            }
                        }
                    }
                };
                let body: ByteStream = Box::pin(rx);
                let (uploaded, pumped) =
                    futures::join!(state.file_service.upload(request, body), pump);
                pumped?;
                stored = Some(uploaded?);
                break;
            }
            "uploader_user_id" | "name" | "folder_id" | "folder_path" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Read error: {e}")))?;
                let text = text.trim().to_string();
                if text.is_empty() {
                    continue;
                }
                match field_name.as_str() {
                    "uploader_user_id" => {
                        uploader = Some(
                            text.parse()
                                .map_err(|_| AppError::validation("Invalid uploader_user_id"))?,
                        );
                    }
                    "name" => name = Some(text),
                    "folder_id" => {
                        folder_id = Some(
                            text.parse()
                                .map_err(|_| AppError::validation("Invalid folder_id"))?,
                        );
                    }
                    _ => folder_path = Some(text),
                }
            }
            _ => {}
        }
    }

    let file = stored.ok_or_else(|| AppError::validation("file is required"))?;

    let trailing = !matches!(multipart.next_field().await, Ok(None));
    if trailing {
        state.file_service.delete(file.id).await?;
        return Err(AppError::validation("The file part must be the last multipart field").into());
    }

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(file.into()))))
}

/// GET /api/files?folder_id=... or ?folder_path=...
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<FileListQuery>,
) -> ApiResult<Json<ApiResponse<Vec<FileResponse>>>> {
    let files = match folder_target(query.folder_id, query.folder_path)? {
        FolderTarget::Root => state.file_service.list(None).await?,
        FolderTarget::Id(id) => state.file_service.list(Some(id)).await?,
        FolderTarget::Path(path) => state.file_service.list_by_folder_path(&path).await?,
    };
    Ok(Json(ApiResponse::ok(views(files))))
}

/// GET /api/files/by-path?path=...
pub async fn get_file_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Json<ApiResponse<FileResponse>>> {
    let file = state.file_service.get_by_virtual_path(&query.path).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// DELETE /api/files/by-path?path=...
pub async fn delete_file_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<StatusCode> {
    state.file_service.delete_by_virtual_path(&query.path).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/files/download?path=...
pub async fn download_file_by_path(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> ApiResult<Response> {
    let download = state.file_service.open_by_virtual_path(&query.path).await?;
    stream_response(download)
}

/// GET /api/files/{id}
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<FileId>,
) -> ApiResult<Json<ApiResponse<FileResponse>>> {
    let file = state.file_service.get(id).await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// GET /api/files/{id}/download
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<FileId>,
) -> ApiResult<Response> {
    let download = state.file_service.open(id).await?;
    stream_response(download)
}

/// PATCH /api/files/{id}
pub async fn update_file(
    State(state): State<AppState>,
    Path(id): Path<FileId>,
    Json(req): Json<UpdateFileRequest>,
) -> ApiResult<Json<ApiResponse<FileResponse>>> {
    let req = validated(req)?;
    let file = state
        .file_service
        .update(
            id,
            SvcUpdateFile {
                name: req.name,
                folder_id: req.folder_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(file.into())))
}

/// DELETE /api/files/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<FileId>,
) -> ApiResult<StatusCode> {
    state.file_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

fn folder_target(
    folder_id: Option<FolderId>,
    folder_path: Option<String>,
) -> Result<FolderTarget, AppError> {
    match (folder_id, folder_path) {
        (Some(_), Some(_)) => Err(AppError::validation(
            "Specify either folder_id or folder_path, not both",
        )),
        (Some(id), None) => Ok(FolderTarget::Id(id)),
        (None, Some(path)) => Ok(FolderTarget::Path(path)),
        (None, None) => Ok(FolderTarget::Root),
    }
}

fn stream_response(download: Download) -> ApiResult<Response> {
    let Download { file, stream } = download;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.mime_type.as_str())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&file.name),
        )
        .header(header::CONTENT_LENGTH, file.size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// `attachment` disposition with an ASCII fallback and the exact name as
/// an RFC 5987 `filename*` parameter.
fn content_disposition(name: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        header_safe(name),
        utf8_percent_encode(name, NON_ALPHANUMERIC)
    )
}

/// Reduce a display name to characters that are safe inside a quoted
/// header parameter.
fn header_safe(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}
