use crate::models::SavingsGoal;
use crate::stats::{round1, round2};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    OnTrack,
    Caution,
    Warning,
    Critical,
}

impl BudgetStatus {
    fn from_percent(bar_percent: f64) -> Self {
        if bar_percent >= 90.0 {
            Self::Critical
        } else if bar_percent >= 75.0 {
            Self::Warning
        } else if bar_percent >= 50.0 {
            Self::Caution
        } else {
            Self::OnTrack
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetSummary {
    pub budget: f64,
    pub monthly_spent: f64,
    pub remaining: f64,
    /// Unclamped; can exceed 100 when overspent.
    pub percent_used: f64,
    pub bar_percent: f64,
    pub daily_budget: f64,
    pub days_in_month: u32,
    pub days_remaining: u32,
    pub available_per_day: f64,
    pub status: BudgetStatus,
    pub low_remaining: bool,
}

impl BudgetSummary {
    pub fn compute(budget: f64, monthly_spent: f64, today: NaiveDate) -> Self {
        let budget = budget.max(0.0);
        let monthly_spent = monthly_spent.max(0.0);
        let remaining = (budget - monthly_spent).max(0.0);
        let percent_used = if budget > 0.0 {
            monthly_spent / budget * 100.0
        } else {
            0.0
        };
        let bar_percent = clamp_percent(percent_used);

        let days_in_month = days_in_month(today);
        let days_remaining = days_in_month - today.day();
        let daily_budget = budget / f64::from(days_in_month);
        let available_per_day = if days_remaining > 0 {
            remaining / f64::from(days_remaining)
        } else {
            0.0
        };

        Self {
            budget: round2(budget),
            monthly_spent: round2(monthly_spent),
            remaining: round2(remaining),
            percent_used: round1(percent_used),
            bar_percent: round1(bar_percent),
            daily_budget: round2(daily_budget),
            days_in_month,
            days_remaining,
            available_per_day: round2(available_per_day),
            status: BudgetStatus::from_percent(bar_percent),
            low_remaining: budget > 0.0 && remaining < budget * 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub category: String,
    pub total: f64,
    pub percentage: f64,
    pub bar_percent: f64,
}

/// Per-category share of the period total, largest first.
pub fn category_breakdown<I>(totals: I) -> Vec<CategoryShare>
where
    I: IntoIterator<Item = (String, f64)>,
{
    let mut merged: Vec<(String, f64)> = Vec::new();
    for (category, total) in totals {
        match merged.iter_mut().find(|(name, _)| *name == category) {
            Some((_, sum)) => *sum += total,
            None => merged.push((category, total)),
        }
    }

    let period_total: f64 = merged.iter().map(|(_, total)| total).sum();
    let mut shares: Vec<CategoryShare> = merged
        .into_iter()
        .map(|(category, total)| {
            let percentage = if period_total > 0.0 {
                total / period_total * 100.0
            } else {
                0.0
            };
            CategoryShare {
                category,
                total: round2(total),
                percentage: round1(percentage),
                bar_percent: round1(clamp_percent(percentage)),
            }
        })
        .collect();
    shares.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseMetrics {
    pub transaction_count: usize,
    pub average: f64,
    pub highest: f64,
    pub top_category: Option<String>,
    pub daily_average: f64,
}

impl ExpenseMetrics {
    pub fn compute(amounts: &[f64], categories: &[CategoryShare], today: NaiveDate) -> Self {
        let total: f64 = amounts.iter().sum();
        let count = amounts.len();
        let average = if count > 0 { total / count as f64 } else { 0.0 };
        let highest = amounts.iter().copied().fold(0.0, f64::max);
        Self {
            transaction_count: count,
            average: round2(average),
            highest: round2(highest),
            top_category: categories.first().map(|share| share.category.clone()),
            daily_average: round2(total / f64::from(days_in_month(today))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub id: i64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub deadline: Option<NaiveDate>,
    /// Unclamped; a goal saved past its target reports more than 100.
    pub percent: f64,
    pub bar_percent: f64,
    pub completed: bool,
}

pub fn goal_progress(goal: &SavingsGoal) -> GoalProgress {
    let percent = ratio_percent(goal.current_amount, goal.target_amount);
    GoalProgress {
        id: goal.id,
        name: goal.name.clone(),
        target_amount: goal.target_amount,
        current_amount: goal.current_amount,
        deadline: goal.deadline,
        percent: round1(percent),
        bar_percent: round1(clamp_percent(percent)),
        completed: goal.target_amount > 0.0 && goal.current_amount >= goal.target_amount,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsSummary {
    pub goals: Vec<GoalProgress>,
    pub total_goals: usize,
    pub completed_goals: usize,
    pub total_saved: f64,
    pub total_target: f64,
    pub overall_percent: f64,
}

impl SavingsSummary {
    pub fn compute(goals: &[SavingsGoal]) -> Self {
        let progress: Vec<GoalProgress> = goals.iter().map(goal_progress).collect();
        let total_saved: f64 = goals.iter().map(|goal| goal.current_amount).sum();
        let total_target: f64 = goals.iter().map(|goal| goal.target_amount).sum();
        Self {
            total_goals: progress.len(),
            completed_goals: progress.iter().filter(|goal| goal.completed).count(),
            goals: progress,
            total_saved: round2(total_saved),
            total_target: round2(total_target),
            overall_percent: round1(ratio_percent(total_saved, total_target)),
        }
    }
}

pub fn ratio_percent(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

pub fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        return 0.0;
    }
    percent.clamp(0.0, 100.0)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .map(|last| last.day())
        .unwrap_or(30)
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = date.with_day(days_in_month(date)).unwrap_or(date);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn goal(current: f64, target: f64) -> SavingsGoal {
        SavingsGoal {
            id: 1,
            user_id: 1,
            name: "Trip".into(),
            target_amount: target,
            current_amount: current,
            deadline: None,
        }
    }

    #[test]
    fn budget_quarter_used() {
        let summary = BudgetSummary::compute(1000.0, 250.0, day(2024, 1, 10));
        assert_eq!(summary.percent_used, 25.0);
        assert_eq!(summary.remaining, 750.0);
        assert_eq!(summary.status, BudgetStatus::OnTrack);
        assert_eq!(summary.days_in_month, 31);
        assert_eq!(summary.days_remaining, 21);
        assert_eq!(summary.available_per_day, round2(750.0 / 21.0));
        assert_eq!(summary.daily_budget, round2(1000.0 / 31.0));
    }

    #[test]
    fn budget_unset_is_all_zero() {
        let summary = BudgetSummary::compute(0.0, 120.0, day(2024, 1, 10));
        assert_eq!(summary.percent_used, 0.0);
        assert_eq!(summary.remaining, 0.0);
        assert_eq!(summary.daily_budget, 0.0);
        assert!(!summary.low_remaining);
    }

    #[test]
    fn budget_overspent_keeps_raw_percent_but_clamps_bar() {
        let summary = BudgetSummary::compute(200.0, 300.0, day(2024, 2, 29));
        assert_eq!(summary.percent_used, 150.0);
        assert_eq!(summary.bar_percent, 100.0);
        assert_eq!(summary.remaining, 0.0);
        assert_eq!(summary.status, BudgetStatus::Critical);
        assert_eq!(summary.days_remaining, 0);
        assert_eq!(summary.available_per_day, 0.0);
        assert!(summary.low_remaining);
    }

    #[test]
    fn categories_with_zero_total_are_zero_percent() {
        let shares = category_breakdown(vec![("Food".to_string(), 0.0), ("Rent".to_string(), 0.0)]);
        assert_eq!(shares.len(), 2);
        assert!(shares.iter().all(|share| share.percentage == 0.0));
    }

    #[test]
    fn categories_sorted_and_merged() {
        let shares = category_breakdown(vec![
            ("Food".to_string(), 30.0),
            ("Rent".to_string(), 50.0),
            ("Food".to_string(), 20.0),
        ]);
        assert_eq!(shares[0].category, "Food");
        assert_eq!(shares[0].total, 50.0);
        assert_eq!(shares[0].percentage, 50.0);
        assert_eq!(shares[1].category, "Rent");
    }

    #[test]
    fn savings_progress_clamps_bar_only() {
        assert_eq!(goal_progress(&goal(300.0, 1000.0)).percent, 30.0);

        let over = goal_progress(&goal(1200.0, 1000.0));
        assert_eq!(over.percent, 120.0);
        assert_eq!(over.bar_percent, 100.0);
        assert!(over.completed);
    }

    #[test]
    fn savings_overall_handles_empty_targets() {
        let empty = SavingsSummary::compute(&[]);
        assert_eq!(empty.overall_percent, 0.0);

        let summary = SavingsSummary::compute(&[goal(300.0, 1000.0), goal(1000.0, 1000.0)]);
        assert_eq!(summary.overall_percent, 65.0);
        assert_eq!(summary.completed_goals, 1);
        assert_eq!(summary.total_goals, 2);
    }

    #[test]
    fn metrics_from_month_rows() {
        let shares = category_breakdown(vec![("Food".to_string(), 30.0), ("Rent".to_string(), 60.0)]);
        let metrics = ExpenseMetrics::compute(&[10.0, 20.0, 60.0], &shares, day(2024, 4, 1));
        assert_eq!(metrics.transaction_count, 3);
        assert_eq!(metrics.average, 30.0);
        assert_eq!(metrics.highest, 60.0);
        assert_eq!(metrics.top_category.as_deref(), Some("Rent"));
        assert_eq!(metrics.daily_average, 3.0);
    }

    #[test]
    fn month_helpers() {
        assert_eq!(days_in_month(day(2024, 2, 10)), 29);
        assert_eq!(days_in_month(day(2023, 12, 31)), 31);
        assert_eq!(month_bounds(day(2024, 4, 15)), (day(2024, 4, 1), day(2024, 4, 30)));
    }
}
