use super::{Store, dated};
use crate::models::{Journal, JournalFields};
use chrono::{NaiveDate, NaiveDateTime};

const JOURNAL_COLUMNS: &str = "id, user_id, title, content, mood, color, entry_date, created_at";

impl Store {
    pub async fn create_journal(
        &self,
        user_id: i64,
        fields: &JournalFields,
        now: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO journals (user_id, title, content, mood, color, entry_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.mood)
        .bind(&fields.color)
        .bind(fields.entry_date)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_journal(&self, user_id: i64, id: i64) -> Result<Option<Journal>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_journals(&self, user_id: i64) -> Result<Vec<Journal>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn recent_journals(&self, user_id: i64, limit: i64) -> Result<Vec<Journal>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {JOURNAL_COLUMNS} FROM journals WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_journal(
        &self,
        user_id: i64,
        id: i64,
        fields: &JournalFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE journals SET title = ?, content = ?, mood = ?, color = ?, entry_date = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.mood)
        .bind(&fields.color)
        .bind(fields.entry_date)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_journal(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM journals WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_journals(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM journals WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Entries whose entry date falls in `first ..= last`.
    pub async fn count_journals_between(
        &self,
        user_id: i64,
        first: NaiveDate,
        last: NaiveDate,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM journals WHERE user_id = ? AND entry_date BETWEEN ? AND ?",
        )
        .bind(user_id)
        .bind(first)
        .bind(last)
        .fetch_one(&self.pool)
        .await
    }

    /// Distinct days carrying at least one entry.
    pub async fn journal_days(&self, user_id: i64) -> Result<Vec<NaiveDate>, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT date(entry_date) AS day, COUNT(*) FROM journals WHERE user_id = ? GROUP BY day",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dated(rows).into_iter().map(|(day, _)| day).collect())
    }
}
