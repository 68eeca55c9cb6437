use crate::errors::AppError;
use crate::models::{FocusSessionInput, FocusTargetInput};
use crate::reports::FocusDay;
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

pub async fn set_goal(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<FocusTargetInput>, JsonRejection>,
) -> Result<Json<FocusDay>, AppError> {
    let Json(input) = payload?;
    let target = input.validate()?;
    let goal = state
        .store
        .set_focus_target(ctx.user_id, ctx.today, target, ctx.now)
        .await?;
    info!(user_id = ctx.user_id, target, "focus target set");
    Ok(Json(FocusDay::from_goal(&goal)))
}

pub async fn record_session(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<FocusSessionInput>, JsonRejection>,
) -> Result<Json<FocusDay>, AppError> {
    let Json(input) = payload?;
    let delta = input.validate()?;
    let goal = state
        .store
        .adjust_focus_sessions(ctx.user_id, ctx.today, delta, ctx.now)
        .await?;
    Ok(Json(FocusDay::from_goal(&goal)))
}
