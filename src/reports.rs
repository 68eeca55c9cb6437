//! Per-page summaries.
//!
//! Each builder runs the page's queries for one [`UserContext`]. A failing
//! statistic is logged and replaced by its empty value so the rest of the
//! page still renders; only a missing user row fails the whole page.

use crate::budget::{
    category_breakdown, clamp_percent, month_bounds, ratio_percent, BudgetSummary,
    CategoryShare, ExpenseMetrics, SavingsSummary,
};
use crate::errors::AppError;
use crate::format::{mood_emoji, relative_time};
use crate::models::{
    DayBucket, Expense, FocusGoal, Habit, HabitSkip, Journal, Note, TaskStatus, Todo, User,
    THEMES,
};
use crate::session::UserContext;
use crate::stats::{
    current_streak, daily_buckets, habit_score, round1, round2, week_label, week_start, WEEK_DAYS,
};
use crate::storage::Store;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use tracing::error;

const RECENT_TASKS: i64 = 5;
const RECENT_JOURNALS: i64 = 5;
const RECENT_NOTES: i64 = 3;
const RECENT_EXPENSES: i64 = 5;
const TOP_HABITS: i64 = 5;
const RECENT_SKIPS: i64 = 3;

fn or_default<T: Default>(stat: &'static str, result: Result<T, sqlx::Error>) -> T {
    result.unwrap_or_else(|err| {
        error!(stat, error = %err, "summary query failed");
        T::default()
    })
}

async fn load_user(store: &Store, ctx: &UserContext) -> Result<User, AppError> {
    store
        .get_user(ctx.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("user"))
}

fn last_week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(WEEK_DAYS) - 1)
}

#[derive(Debug, Clone, Serialize)]
pub struct PageHeader {
    pub username: String,
    pub theme: String,
    pub today: NaiveDate,
}

impl PageHeader {
    fn new(user: &User, ctx: &UserContext) -> Self {
        Self {
            username: user.username.clone(),
            theme: user.theme.clone(),
            today: ctx.today,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskItem {
    #[serde(flatten)]
    pub todo: Todo,
    pub due: String,
}

impl TaskItem {
    fn new(todo: Todo, ctx: &UserContext) -> Self {
        let due = relative_time(ctx.now, todo.due_date);
        Self { todo, due }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalItem {
    #[serde(flatten)]
    pub journal: Journal,
    pub mood_emoji: String,
    pub written: String,
}

impl JournalItem {
    fn new(journal: Journal, ctx: &UserContext) -> Self {
        Self {
            mood_emoji: mood_emoji(&journal.mood),
            written: relative_time(ctx.now, Some(journal.created_at)),
            journal,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitRank {
    pub name: String,
    pub completed: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityItem {
    pub id: i64,
    pub title: String,
    pub when: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub active_todos: i64,
    pub total_notes: i64,
    pub habit_count: i64,
    pub budget: BudgetSummary,
    pub completed_today: i64,
    pub due_today: i64,
    pub habit_logs_today: i64,
    pub notes_today: i64,
    pub notes_this_week: i64,
    pub habit_success_rate: f64,
    pub completion_rate: f64,
    pub recent_tasks: Vec<TaskItem>,
    pub recent_journals: Vec<JournalItem>,
    pub recent_notes: Vec<Note>,
    pub recent_expenses: Vec<Expense>,
    pub top_habits: Vec<HabitRank>,
    pub todays_tasks: Vec<TaskItem>,
    pub activity: Vec<ActivityItem>,
    pub weekly_progress: Vec<DayBucket<i64>>,
}

pub async fn dashboard(store: &Store, ctx: &UserContext) -> Result<DashboardView, AppError> {
    let user = load_user(store, ctx).await?;
    let uid = ctx.user_id;
    let today = ctx.today;
    let week_from = last_week_start(today);
    let (month_first, month_last) = month_bounds(today);

    let active_todos = or_default(
        "active_todos",
        store.count_todos_with_status(uid, TaskStatus::Pending).await,
    );
    let completed_todos = or_default(
        "completed_todos",
        store.count_todos_with_status(uid, TaskStatus::Completed).await,
    );
    let total_todos = or_default("total_todos", store.count_todos(uid).await);

    let budget_amount = or_default("budget", store.budget_amount(uid).await);
    let monthly_spent = or_default(
        "monthly_spent",
        store.expense_total_between(uid, month_first, month_last).await,
    );

    let habit_success_rate = or_default(
        "habit_success_rate",
        store.habit_success_rate_since(uid, week_from).await,
    )
    .map(round1)
    .unwrap_or(0.0);

    let recent_tasks = or_default("recent_tasks", store.recent_todos(uid, RECENT_TASKS).await)
        .into_iter()
        .map(|todo| TaskItem::new(todo, ctx))
        .collect();
    let recent_journals = or_default(
        "recent_journals",
        store.recent_journals(uid, RECENT_JOURNALS).await,
    )
    .into_iter()
    .map(|journal| JournalItem::new(journal, ctx))
    .collect();
    let todays_tasks = or_default("todays_tasks", store.tasks_for_day(uid, today).await)
        .into_iter()
        .map(|todo| TaskItem::new(todo, ctx))
        .collect();
    let top_habits = or_default("top_habits", store.top_habits(uid, TOP_HABITS).await)
        .into_iter()
        .map(|(name, completed)| HabitRank { name, completed })
        .collect();

    let since = week_from.and_hms_opt(0, 0, 0).unwrap_or(ctx.now);
    let activity = or_default("activity", store.todos_created_since(uid, since).await)
        .into_iter()
        .map(|todo| ActivityItem {
            id: todo.id,
            when: relative_time(ctx.now, Some(todo.created_at)),
            title: todo.title,
        })
        .collect();
    let created_per_day = or_default(
        "weekly_progress",
        store.todos_created_per_day(uid, week_from).await,
    );

    Ok(DashboardView {
        header: PageHeader::new(&user, ctx),
        active_todos,
        total_notes: or_default("total_notes", store.count_notes(uid).await),
        habit_count: or_default("habit_count", store.count_habits(uid).await),
        budget: BudgetSummary::compute(budget_amount, monthly_spent, today),
        completed_today: or_default("completed_today", store.count_completed_on(uid, today).await),
        due_today: or_default("due_today", store.count_due_on(uid, today).await),
        habit_logs_today: or_default(
            "habit_logs_today",
            store.count_habit_logs_on(uid, today).await,
        ),
        notes_today: or_default("notes_today", store.count_notes_since(uid, today).await),
        notes_this_week: or_default(
            "notes_this_week",
            store.count_notes_since(uid, week_from).await,
        ),
        habit_success_rate,
        completion_rate: round1(ratio_percent(completed_todos as f64, total_todos as f64)),
        recent_tasks,
        recent_journals,
        recent_notes: or_default("recent_notes", store.recent_notes(uid, RECENT_NOTES).await),
        recent_expenses: or_default(
            "recent_expenses",
            store.recent_expenses(uid, RECENT_EXPENSES).await,
        ),
        top_habits,
        todays_tasks,
        activity,
        weekly_progress: daily_buckets(today, WEEK_DAYS, created_per_day),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct TodosView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub todos: Vec<TaskItem>,
    pub pending: usize,
    pub completed: usize,
}

pub async fn todos(store: &Store, ctx: &UserContext) -> Result<TodosView, AppError> {
    let user = load_user(store, ctx).await?;
    let todos: Vec<TaskItem> = or_default("todos", store.list_todos(ctx.user_id).await)
        .into_iter()
        .map(|todo| TaskItem::new(todo, ctx))
        .collect();
    let completed = todos
        .iter()
        .filter(|item| item.todo.status == TaskStatus::Completed)
        .count();
    Ok(TodosView {
        header: PageHeader::new(&user, ctx),
        pending: todos.len() - completed,
        completed,
        todos,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct NotesView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub notes: Vec<Note>,
}

pub async fn notes(store: &Store, ctx: &UserContext) -> Result<NotesView, AppError> {
    let user = load_user(store, ctx).await?;
    Ok(NotesView {
        header: PageHeader::new(&user, ctx),
        notes: or_default("notes", store.list_notes(ctx.user_id).await),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitCard {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
    pub live_completion_rate: f64,
    pub logged_today: bool,
    pub recent_skips: Vec<HabitSkip>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HabitsView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub habits: Vec<HabitCard>,
}

pub async fn habits(store: &Store, ctx: &UserContext) -> Result<HabitsView, AppError> {
    let user = load_user(store, ctx).await?;
    let list = or_default("habits", store.list_habits(ctx.user_id).await);

    let mut cards = Vec::with_capacity(list.len());
    for habit in list {
        let log = or_default("habit_log", store.habit_log_days(ctx.user_id, habit.id).await);
        let score = habit_score(&log, habit.created_at.date(), ctx.today);
        let recent_skips = or_default(
            "habit_skips",
            store
                .recent_habit_skips(ctx.user_id, habit.id, RECENT_SKIPS)
                .await,
        );
        cards.push(HabitCard {
            current_streak: score.streak,
            live_completion_rate: score.completion_rate,
            logged_today: log.iter().any(|(day, _)| *day == ctx.today),
            recent_skips,
            habit,
        });
    }

    Ok(HabitsView {
        header: PageHeader::new(&user, ctx),
        habits: cards,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct JournalsView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub entries: Vec<JournalItem>,
    pub total_entries: i64,
    pub entries_this_month: i64,
    pub writing_streak: u32,
}

pub async fn journals(store: &Store, ctx: &UserContext) -> Result<JournalsView, AppError> {
    let user = load_user(store, ctx).await?;
    let (month_first, month_last) = month_bounds(ctx.today);
    let days = or_default("journal_days", store.journal_days(ctx.user_id).await);

    Ok(JournalsView {
        header: PageHeader::new(&user, ctx),
        entries: or_default("journals", store.list_journals(ctx.user_id).await)
            .into_iter()
            .map(|journal| JournalItem::new(journal, ctx))
            .collect(),
        total_entries: or_default("total_entries", store.count_journals(ctx.user_id).await),
        entries_this_month: or_default(
            "entries_this_month",
            store
                .count_journals_between(ctx.user_id, month_first, month_last)
                .await,
        ),
        writing_streak: current_streak(days.into_iter().map(|day| (day, true)), ctx.today),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekSpend {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub days: Vec<DayBucket<f64>>,
    pub total: f64,
    pub daily_average: f64,
    pub categories: Vec<CategoryShare>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpensesView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub expenses: Vec<Expense>,
    pub budget: BudgetSummary,
    pub metrics: ExpenseMetrics,
    pub categories: Vec<CategoryShare>,
    pub week: WeekSpend,
    pub savings: SavingsSummary,
}

/// Sunday closing the ISO week that contains `date`.
fn selected_week_end(date: NaiveDate) -> Result<NaiveDate, AppError> {
    if !(1..=9999).contains(&date.year()) {
        return Err(AppError::bad_request("week is out of range"));
    }
    Ok(week_start(date) + Duration::days(i64::from(WEEK_DAYS) - 1))
}

/// `week` picks the Monday-based week containing that date; without it the
/// trailing seven days ending today are shown.
pub async fn expenses(
    store: &Store,
    ctx: &UserContext,
    week: Option<NaiveDate>,
) -> Result<ExpensesView, AppError> {
    let user = load_user(store, ctx).await?;
    let uid = ctx.user_id;
    let (month_first, month_last) = month_bounds(ctx.today);

    let expenses = or_default(
        "month_expenses",
        store.expenses_between(uid, month_first, month_last).await,
    );
    let amounts: Vec<f64> = expenses.iter().map(|expense| expense.amount).collect();
    let monthly_spent: f64 = amounts.iter().sum();
    let budget_amount = or_default("budget", store.budget_amount(uid).await);
    let categories = category_breakdown(or_default(
        "month_categories",
        store.category_totals_between(uid, month_first, month_last).await,
    ));

    let week_end = match week {
        Some(date) => selected_week_end(date)?,
        None => ctx.today,
    };
    let week_first = last_week_start(week_end);
    let days = daily_buckets(
        week_end,
        WEEK_DAYS,
        or_default(
            "daily_spend",
            store.daily_expense_totals(uid, week_first, week_end).await,
        ),
    );
    let week_total = round2(days.iter().map(|bucket| bucket.value).sum());
    let week_categories = category_breakdown(or_default(
        "week_categories",
        store.category_totals_between(uid, week_first, week_end).await,
    ));

    let goals = or_default("savings_goals", store.list_savings_goals(uid).await);

    Ok(ExpensesView {
        header: PageHeader::new(&user, ctx),
        budget: BudgetSummary::compute(budget_amount, monthly_spent, ctx.today),
        metrics: ExpenseMetrics::compute(&amounts, &categories, ctx.today),
        categories,
        week: WeekSpend {
            label: week_label(week_first),
            start: week_first,
            end: week_end,
            days,
            total: week_total,
            daily_average: round2(week_total / f64::from(WEEK_DAYS)),
            categories: week_categories,
        },
        savings: SavingsSummary::compute(&goals),
        expenses,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FocusDay {
    pub date: Option<NaiveDate>,
    pub target_sessions: i64,
    pub completed_sessions: i64,
    pub percent: f64,
    pub bar_percent: f64,
    pub remaining: i64,
    pub achieved: bool,
}

impl FocusDay {
    pub fn from_goal(goal: &FocusGoal) -> Self {
        let percent = ratio_percent(
            goal.completed_sessions as f64,
            goal.target_sessions.max(1) as f64,
        );
        Self {
            date: Some(goal.goal_date),
            target_sessions: goal.target_sessions,
            completed_sessions: goal.completed_sessions,
            percent: round1(percent),
            bar_percent: round1(clamp_percent(percent)),
            remaining: (goal.target_sessions - goal.completed_sessions).max(0),
            achieved: goal.completed_sessions >= goal.target_sessions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FocusView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub today: FocusDay,
    pub yesterday: Option<FocusDay>,
    pub streak: u32,
}

pub async fn focus(store: &Store, ctx: &UserContext) -> Result<FocusView, AppError> {
    let user = load_user(store, ctx).await?;
    let uid = ctx.user_id;

    let today = match store.focus_goal_for(uid, ctx.today, ctx.now).await {
        Ok(goal) => FocusDay::from_goal(&goal),
        Err(err) => {
            error!(stat = "focus_today", error = %err, "summary query failed");
            FocusDay::default()
        }
    };
    let yesterday = or_default(
        "focus_yesterday",
        store
            .get_focus_goal(uid, ctx.today - Duration::days(1))
            .await,
    )
    .map(|goal| FocusDay::from_goal(&goal));
    let days = or_default("focus_days", store.focus_days(uid).await);

    Ok(FocusView {
        header: PageHeader::new(&user, ctx),
        today,
        yesterday,
        streak: current_streak(days, ctx.today),
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    #[serde(flatten)]
    pub header: PageHeader,
    pub email: String,
    pub member_since: NaiveDate,
    pub themes: Vec<&'static str>,
    pub budget: f64,
}

pub async fn settings(store: &Store, ctx: &UserContext) -> Result<SettingsView, AppError> {
    let user = load_user(store, ctx).await?;
    Ok(SettingsView {
        header: PageHeader::new(&user, ctx),
        email: user.email.clone(),
        member_since: user.created_at.date(),
        themes: THEMES.to_vec(),
        budget: or_default("budget", store.budget_amount(ctx.user_id).await),
    })
}
