use super::{changed, found};
use crate::budget::{goal_progress, GoalProgress};
use crate::errors::AppError;
use crate::models::{AmountInput, ApiResponse, Expense, ExpenseInput, SavingsGoalInput};
use crate::session::UserContext;
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use tracing::info;

pub async fn create(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate(ctx.today)?;
    let id = state.store.create_expense(ctx.user_id, &fields).await?;
    info!(user_id = ctx.user_id, expense_id = id, amount = fields.amount, "expense added");
    Ok(Json(ApiResponse::created(id, "Expense added")))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<Expense>, AppError> {
    Ok(Json(found(state.store.get_expense(ctx.user_id, id).await?, "expense")?))
}

pub async fn update(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<ExpenseInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate(ctx.today)?;
    let touched = state.store.update_expense(ctx.user_id, id, &fields).await?;
    changed(touched, "expense", "Expense updated")
}

pub async fn delete(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_expense(ctx.user_id, id).await?;
    changed(touched, "expense", "Expense deleted")
}

pub async fn set_budget(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<AmountInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let amount = input.validate()?;
    state.store.set_budget(ctx.user_id, amount).await?;
    info!(user_id = ctx.user_id, amount, "budget set");
    Ok(Json(ApiResponse::ok("Budget updated")))
}

pub async fn create_goal(
    State(state): State<AppState>,
    ctx: UserContext,
    payload: Result<Json<SavingsGoalInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let id = state.store.create_savings_goal(ctx.user_id, &fields).await?;
    Ok(Json(ApiResponse::created(id, "Savings goal created")))
}

pub async fn update_goal(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<SavingsGoalInput>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(input) = payload?;
    let fields = input.validate()?;
    let touched = state.store.update_savings_goal(ctx.user_id, id, &fields).await?;
    changed(touched, "savings goal", "Savings goal updated")
}

pub async fn delete_goal(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, AppError> {
    let touched = state.store.delete_savings_goal(ctx.user_id, id).await?;
    changed(touched, "savings goal", "Savings goal deleted")
}

pub async fn contribute(
    State(state): State<AppState>,
    ctx: UserContext,
    Path(id): Path<i64>,
    payload: Result<Json<AmountInput>, JsonRejection>,
) -> Result<Json<GoalProgress>, AppError> {
    let Json(input) = payload?;
    let amount = input.validate()?;
    let goal = found(
        state.store.contribute_to_goal(ctx.user_id, id, amount).await?,
        "savings goal",
    )?;
    Ok(Json(goal_progress(&goal)))
}
