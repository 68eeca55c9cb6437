use super::{changed, found};
use crate::errors::AppError;
use crate::models::{ApiResponse, Habit, HabitInput, HabitLogInput, HabitSkipInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

pub async fn create(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<HabitInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let id = state.store.create_habit(ctx.user_id, &fields, ctx.now).await?;
    Ok(Json(ApiResponse::created(id, "Habit created")))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<Habit>, AppError> {
    Ok(Json(found(state.store.get_habit(ctx.user_id, id).await?, "habit")?))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<HabitInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let touched = state.store.update_habit(ctx.user_id, id, &fields).await?;
    changed(touched, "habit", "Habit updated")
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_habit(ctx.user_id, id).await?;
    changed(touched, "habit", "Habit deleted")
}

/// An empty body logs a completion.
pub async fn log(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Habit>, AppError> {
    let input: HabitLogInput = if body.iter().all(u8::is_ascii_whitespace) {
        HabitLogInput::default()
    } else {
        serde_json::from_slice(&body).map_err(|err| AppError::bad_request(err.to_string()))?
    };
    let completed = input.completed.unwrap_or(true);

    let habit = found(
        state
            .store
            .record_habit_log(ctx.user_id, id, completed, ctx.now)
            .await?,
        "habit",
    )?;
    info!(
        user_id = ctx.user_id,
        habit_id = id,
        completed,
        streak = habit.streak,
        "habit logged"
    );
    Ok(Json(habit))
}

pub async fn skip(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<HabitSkipInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let reason = input.validate()?;
    let touched = state
        .store
        .record_habit_skip(ctx.user_id, id, &reason, ctx.today)
        .await?;
    changed(touched, "habit", "Skip recorded")
}
