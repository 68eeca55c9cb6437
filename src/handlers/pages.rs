use crate::errors::AppError;
use crate::format::parse_timestamp;
use crate::reports::{
    self, DashboardView, ExpensesView, FocusView, HabitsView, JournalsView, NotesView,
    SettingsView, TodosView,
};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

pub async fn dashboard(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<DashboardView>, AppError> {
    Ok(Json(reports::dashboard(&state.store, &ctx).await?))
}

pub async fn todos(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<TodosView>, AppError> {
    Ok(Json(reports::todos(&state.store, &ctx).await?))
}

pub async fn notes(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<NotesView>, AppError> {
    Ok(Json(reports::notes(&state.store, &ctx).await?))
}

pub async fn habits(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<HabitsView>, AppError> {
    Ok(Json(reports::habits(&state.store, &ctx).await?))
}

pub async fn journals(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<JournalsView>, AppError> {
    Ok(Json(reports::journals(&state.store, &ctx).await?))
}

#[derive(Debug, Deserialize)]
pub struct WeekQuery {
    pub week: Option<String>,
}

pub async fn expenses(
    State(state): State<AppState>,
    ctx: UserContext,
    Query(query): Query<WeekQuery>,
) -> Result<Json<ExpensesView>, AppError> {
    let week = match query.week.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            parse_timestamp(raw)
                .map(|ts| ts.date())
                .ok_or_else(|| AppError::bad_request("week must be a valid date"))?,
        ),
    };
    Ok(Json(reports::expenses(&state.store, &ctx, week).await?))
}

pub async fn focus(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<FocusView>, AppError> {
    Ok(Json(reports::focus(&state.store, &ctx).await?))
}

pub async fn settings(
    State(state): State<AppState>,
    ctx: UserContext,
) -> Result<Json<SettingsView>, AppError> {
    Ok(Json(reports::settings(&state.store, &ctx).await?))
}
