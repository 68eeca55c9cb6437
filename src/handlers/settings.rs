use crate::errors::AppError;
use crate::models::{ApiResponse, ThemeInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use tracing::info;

/// Persists the theme and applies it to the live session.
pub async fn set_theme(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<ThemeInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let theme = input.validate()?;
    if !state.store.set_theme(ctx.user_id, theme).await? {
        return Err(AppError::not_found("user"));
    }
    state.sessions.set_theme(&ctx.token, theme).await;
    info!(user_id = ctx.user_id, theme, "theme changed");
    Ok(Json(ApiResponse::ok("Theme updated")))
}
