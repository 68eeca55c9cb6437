use super::{Store, dated};
use crate::models::{Expense, ExpenseFields, SavingsGoal, SavingsGoalFields};
use chrono::NaiveDate;

const EXPENSE_COLUMNS: &str = "id, user_id, amount, category, description, date";
const GOAL_COLUMNS: &str = "id, user_id, name, target_amount, current_amount, deadline";

impl Store {
    pub async fn create_expense(&self, user_id: i64, fields: &ExpenseFields) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO expenses (user_id, amount, category, description, date) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(fields.amount)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(fields.date)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_expense(&self, user_id: i64, id: i64) -> Result<Option<Expense>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn update_expense(
        &self,
        user_id: i64,
        id: i64,
        fields: &ExpenseFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE expenses SET amount = ?, category = ?, description = ?, date = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(fields.amount)
        .bind(&fields.category)
        .bind(&fields.description)
        .bind(fields.date)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_expense(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Expenses dated within `first ..= last`, newest first.
    pub async fn expenses_between(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<Expense>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = ? AND date BETWEEN ? AND ? ORDER BY date DESC, id DESC"
        ))
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn expense_total_between(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COALESCE(SUM(amount), 0.0) FROM expenses WHERE user_id = ? AND date BETWEEN ? AND ?",
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn category_totals_between(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<(String, f64)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT category, SUM(amount) FROM expenses
            WHERE user_id = ? AND date BETWEEN ? AND ?
            GROUP BY category
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn daily_expense_totals(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<Vec<(NaiveDate, f64)>, sqlx::Error> {
        let rows: Vec<(String, f64)> = sqlx::query_as(
            r#"
            SELECT date(date) AS day, SUM(amount) FROM expenses
            WHERE user_id = ? AND date BETWEEN ? AND ?
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_all(&self.pool)
        .await?;
        Ok(dated(rows))
    }

    pub async fn recent_expenses(&self, user_id: i64, limit: i64) -> Result<Vec<Expense>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {EXPENSE_COLUMNS} FROM expenses WHERE user_id = ? ORDER BY date DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn create_savings_goal(
        &self,
        user_id: i64,
        fields: &SavingsGoalFields,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO savings_goals (user_id, name, target_amount, current_amount, deadline)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(fields.target_amount)
        .bind(fields.current_amount)
        .bind(fields.deadline)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn update_savings_goal(
        &self,
        user_id: i64,
        id: i64,
        fields: &SavingsGoalFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE savings_goals SET name = ?, target_amount = ?, current_amount = ?, deadline = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&fields.name)
        .bind(fields.target_amount)
        .bind(fields.current_amount)
        .bind(fields.deadline)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Adds `amount` to a goal's saved total and returns the updated goal.
    pub async fn contribute_to_goal(
        &self,
        user_id: i64,
        id: i64,
        amount: f64,
    ) -> Result<Option<SavingsGoal>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"
            UPDATE savings_goals SET current_amount = current_amount + ?
            WHERE id = ? AND user_id = ?
            RETURNING {GOAL_COLUMNS}
            "#
        ))
        .bind(amount)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_savings_goal(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM savings_goals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Goals by nearest deadline; undated goals last.
    pub async fn list_savings_goals(&self, user_id: i64) -> Result<Vec<SavingsGoal>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"
            SELECT {GOAL_COLUMNS} FROM savings_goals WHERE user_id = ?
            ORDER BY deadline IS NULL, deadline ASC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
