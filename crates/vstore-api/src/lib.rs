//! # vstore-api
//!
//! HTTP API layer for the virtual storage service built on Axum.
//!
//! Provides the folder, file, and archive endpoints, health probes,
//! middleware (CORS, compression, request logging), DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
