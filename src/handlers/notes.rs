use super::{changed, found};
use crate::errors::AppError;
use crate::models::{ApiResponse, Note, NoteInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

pub async fn create(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let id = state.store.create_note(ctx.user_id, &fields, ctx.now).await?;
    Ok(Json(ApiResponse::created(id, "Note created")))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<Note>, AppError> {
    Ok(Json(found(state.store.get_note(ctx.user_id, id).await?, "note")?))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<NoteInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let touched = state.store.update_note(ctx.user_id, id, &fields).await?;
    changed(touched, "note", "Note updated")
}

#[derive(Debug, Serialize)]
pub struct PinResponse {
    pub success: bool,
    pub is_pinned: bool,
}

pub async fn toggle_pin(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<PinResponse>, AppError> {
    let is_pinned = found(state.store.toggle_note_pin(ctx.user_id, id).await?, "note")?;
    Ok(Json(PinResponse {
        success: true,
        is_pinned,
    }))
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_note(ctx.user_id, id).await?;
    changed(touched, "note", "Note deleted")
}
