pub mod auth;
pub mod expenses;
pub mod focus;
pub mod habits;
pub mod journals;
pub mod notes;
pub mod pages;
pub mod settings;
pub mod tasks;

use crate::errors::AppError;
use crate::models::ApiResponse;
use axum::Json;

/// Maps a row that may belong to someone else to 404.
fn found<T>(row: Option<T>, what: &str) -> Result<T, AppError> {
    row.ok_or_else(|| AppError::not_found(what))
}

/// Maps a write that touched no row to 404.
fn changed(touched: bool, what: &str, message: &str) -> Result<Json<ApiResponse>, AppError> {
    if touched {
        Ok(Json(ApiResponse::ok(message)))
    } else {
        Err(AppError::not_found(what))
    }
}
