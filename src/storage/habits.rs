use super::{Store, dated};
use crate::models::{Habit, HabitFields, HabitSkip};
use crate::stats::habit_score;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, frequency, streak, completion_rate, created_at";

impl Store {
    pub async fn create_habit(
        &self,
        user_id: i64,
        fields: &HabitFields,
        now: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO habits (user_id, name, description, frequency, streak, completion_rate, created_at)
            VALUES (?, ?, ?, ?, 0, 0, ?)
            "#,
        )
        .bind(user_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.frequency.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_habit(&self, user_id: i64, id: i64) -> Result<Option<Habit>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_habit(&mut *conn, user_id, id).await
    }

    pub async fn list_habits(&self, user_id: i64) -> Result<Vec<Habit>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_habit(
        &self,
        user_id: i64,
        id: i64,
        fields: &HabitFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE habits SET name = ?, description = ?, frequency = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.frequency.as_str())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Removes the habit together with its logs and skips.
    pub async fn delete_habit(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM habits WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(false);
        }
        for table in ["habit_logs", "habit_skips"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE habit_id = ? AND user_id = ?"))
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(true)
    }

    /// Appends a log entry and refreshes the habit's cached streak and
    /// completion rate. `None` when the habit is not the caller's.
    pub async fn record_habit_log(
        &self,
        user_id: i64,
        habit_id: i64,
        completed: bool,
        now: NaiveDateTime,
    ) -> Result<Option<Habit>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let Some(habit) = fetch_habit(&mut *tx, user_id, habit_id).await? else {
            return Ok(None);
        };

        sqlx::query(
            "INSERT INTO habit_logs (habit_id, user_id, completed, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(completed)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let log = fetch_log_days(&mut *tx, user_id, habit_id).await?;
        let score = habit_score(&log, habit.created_at.date(), now.date());
        sqlx::query("UPDATE habits SET streak = ?, completion_rate = ? WHERE id = ? AND user_id = ?")
            .bind(i64::from(score.streak))
            .bind(score.completion_rate)
            .bind(habit_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let updated = fetch_habit(&mut *tx, user_id, habit_id).await?;
        tx.commit().await?;
        Ok(updated)
    }

    /// Records a skip with its reason. `false` when the habit is not the
    /// caller's.
    pub async fn record_habit_skip(
        &self,
        user_id: i64,
        habit_id: i64,
        reason: &str,
        day: NaiveDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO habit_skips (habit_id, user_id, reason, skip_date)
            SELECT id, user_id, ?, ? FROM habits WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(reason)
        .bind(day)
        .bind(habit_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn habit_log_days(
        &self,
        user_id: i64,
        habit_id: i64,
    ) -> Result<Vec<(NaiveDate, bool)>, sqlx::Error> {
        let mut conn = self.pool.acquire().await?;
        fetch_log_days(&mut *conn, user_id, habit_id).await
    }

    pub async fn recent_habit_skips(
        &self,
        user_id: i64,
        habit_id: i64,
        limit: i64,
    ) -> Result<Vec<HabitSkip>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT id, habit_id, reason, skip_date FROM habit_skips
            WHERE habit_id = ? AND user_id = ?
            ORDER BY skip_date DESC, id DESC LIMIT ?
            "#,
        )
        .bind(habit_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn count_habits(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM habits WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_habit_logs_on(&self, user_id: i64, day: NaiveDate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM habit_logs WHERE user_id = ? AND date(created_at) = ?",
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await
    }

    /// Mean of completed×100 over logs since `since`; `None` without logs.
    pub async fn habit_success_rate_since(
        &self,
        user_id: i64,
        since: NaiveDate,
    ) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT AVG(CASE WHEN completed = 1 THEN 100.0 ELSE 0.0 END) FROM habit_logs
            WHERE user_id = ? AND date(created_at) >= ?
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.pool)
        .await
    }

    /// Habits ranked by number of completed logs.
    pub async fn top_habits(&self, user_id: i64, limit: i64) -> Result<Vec<(String, i64)>, sqlx::Error> {
        sqlx::query_as(
            r#"
            SELECT h.name, COUNT(hl.id) AS completed
            FROM habits h
            LEFT JOIN habit_logs hl ON hl.habit_id = h.id AND hl.completed = 1
            WHERE h.user_id = ?
            GROUP BY h.id
            ORDER BY completed DESC, h.name ASC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}

async fn fetch_habit(
    conn: &mut SqliteConnection,
    user_id: i64,
    id: i64,
) -> Result<Option<Habit>, sqlx::Error> {
    sqlx::query_as(&format!(
        "SELECT {HABIT_COLUMNS} FROM habits WHERE id = ? AND user_id = ?"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(conn)
    .await
}

/// One entry per logged day; a day counts as done if any log that day was.
async fn fetch_log_days(
    conn: &mut SqliteConnection,
    user_id: i64,
    habit_id: i64,
) -> Result<Vec<(NaiveDate, bool)>, sqlx::Error> {
    let rows: Vec<(String, bool)> = sqlx::query_as(
        r#"
        SELECT date(created_at) AS day, MAX(completed) = 1 FROM habit_logs
        WHERE habit_id = ? AND user_id = ?
        GROUP BY day
        "#,
    )
    .bind(habit_id)
    .bind(user_id)
    .fetch_all(conn)
    .await?;
    Ok(dated(rows))
}
