use super::{changed, found};
use crate::errors::AppError;
use crate::models::{ApiResponse, Journal, JournalInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

pub async fn create(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<JournalInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate(ctx.today)?;
    let id = state.store.create_journal(ctx.user_id, &fields, ctx.now).await?;
    Ok(Json(ApiResponse::created(id, "Journal entry saved")))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<Journal>, AppError> {
    Ok(Json(found(
        state.store.get_journal(ctx.user_id, id).await?,
        "journal entry",
    )?))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<JournalInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate(ctx.today)?;
    let touched = state.store.update_journal(ctx.user_id, id, &fields).await?;
    changed(touched, "journal entry", "Journal entry updated")
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_journal(ctx.user_id, id).await?;
    changed(touched, "journal entry", "Journal entry deleted")
}
