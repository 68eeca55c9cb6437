use super::{changed, found};
use crate::errors::AppError;
use crate::models::{ApiResponse, TaskStatusInput, Todo, TodoInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

pub async fn create(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let id = state.store.create_todo(ctx.user_id, &fields, ctx.now).await?;
    info!(user_id = ctx.user_id, todo_id = id, "task created");
    Ok(Json(ApiResponse::created(id, "Task created")))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<Todo>, AppError> {
    let todo = found(state.store.get_todo(ctx.user_id, id).await?, "task")?;
    Ok(Json(todo))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<TodoInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let touched = state.store.update_todo(ctx.user_id, id, &fields).await?;
    changed(touched, "task", "Task updated")
}

pub async fn set_status(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<TaskStatusInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let status = input.validate()?;
    let touched = state
        .store
        .set_todo_status(ctx.user_id, id, status, ctx.now)
        .await?;
    if touched {
        info!(user_id = ctx.user_id, todo_id = id, status = status.as_str(), "task status set");
    }
    changed(touched, "task", "Task status updated")
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_todo(ctx.user_id, id).await?;
    changed(touched, "task", "Task deleted")
}
