//! Route definitions for the virtual storage HTTP API.
//!
//! Resource routes are mounted under `/api`; the legacy health probe stays
//! at `/v1/healthcheck`.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{delete, get},
};

use crate::handlers;
use crate::state::AppState;

/// Build the router with all routes and the upload size limit.
pub fn build_router(state: AppState) -> Router {
    let max_upload =
        usize::try_from(state.config.storage.max_upload_size_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        .merge(folder_routes())
        .merge(file_routes())
        .merge(archive_routes())
        .route("/health", get(handlers::health::health));

    Router::new()
        .nest("/api", api_routes)
        .route("/v1/healthcheck", get(handlers::health::health))
        .layer(DefaultBodyLimit::max(max_upload))
        .with_state(state)
}

/// Folder endpoints
fn folder_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/folders",
            get(handlers::folder::list_folders).post(handlers::folder::create_folder),
        )
        .route("/folders/by-path", get(handlers::folder::get_folder_by_path))
        .route(
            "/folders/{id}",
            get(handlers::folder::get_folder)
                .patch(handlers::folder::update_folder)
                .delete(handlers::folder::delete_folder),
        )
        .route(
            "/folders/{id}/contents",
            get(handlers::folder::folder_contents),
        )
        .route(
            "/folders/{id}/archives",
            get(handlers::archive::list_archives).post(handlers::archive::record_archive),
        )
}

/// File endpoints
fn file_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/files",
            get(handlers::file::list_files).post(handlers::file::upload_file),
        )
        .route(
            "/files/by-path",
            get(handlers::file::get_file_by_path).delete(handlers::file::delete_file_by_path),
        )
        .route(
            "/files/download",
            get(handlers::file::download_file_by_path),
        )
        .route(
            "/files/{id}",
            get(handlers::file::get_file)
                .patch(handlers::file::update_file)
                .delete(handlers::file::delete_file),
        )
        .route("/files/{id}/download", get(handlers::file::download_file))
}

/// Archive endpoints
fn archive_routes() -> Router<AppState> {
    Router::new().route("/archives/{id}", delete(handlers::archive::delete_archive))
}

