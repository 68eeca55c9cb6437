use super::Store;
use crate::models::{DEFAULT_THEME, NewUser, User};
use chrono::NaiveDateTime;

const USER_COLUMNS: &str = "id, username, email, password_hash, theme, created_at";

impl Store {
    pub async fn create_user(
        &self,
        user: &NewUser,
        password_hash: &str,
        now: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, theme, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(password_hash)
        .bind(DEFAULT_THEME)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn username_or_email_taken(
        &self,
        username: &str,
        email: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn set_theme(&self, user_id: i64, theme: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET theme = ? WHERE id = ?")
            .bind(theme)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns the stored budget, creating the preferences row on first use.
    /// Insert and read share one transaction.
    pub async fn budget_amount(&self, user_id: i64) -> Result<f64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO user_preferences (user_id, budget_amount) VALUES (?, 0) ON CONFLICT(user_id) DO NOTHING",
        )
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
        let amount: f64 =
            sqlx::query_scalar("SELECT budget_amount FROM user_preferences WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&mut *tx)
                .await?;
        tx.commit().await?;
        Ok(amount)
    }

    pub async fn set_budget(&self, user_id: i64, amount: f64) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, budget_amount) VALUES (?, ?)
            ON CONFLICT(user_id) DO UPDATE SET budget_amount = excluded.budget_amount
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
