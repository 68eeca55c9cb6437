use super::Store;
use crate::models::{Note, NoteFields};
use chrono::{NaiveDate, NaiveDateTime};

const NOTE_COLUMNS: &str = "id, user_id, title, content, color, is_pinned, created_at";

impl Store {
    pub async fn create_note(
        &self,
        user_id: i64,
        fields: &NoteFields,
        now: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO notes (user_id, title, content, color, is_pinned, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.color)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_note(&self, user_id: i64, id: i64) -> Result<Option<Note>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn list_notes(&self, user_id: i64) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY is_pinned DESC, created_at DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_note(
        &self,
        user_id: i64,
        id: i64,
        fields: &NoteFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE notes SET title = ?, content = ?, color = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&fields.title)
        .bind(&fields.content)
        .bind(&fields.color)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Flips the pin and returns the new state, or `None` for a missing note.
    pub async fn toggle_note_pin(&self, user_id: i64, id: i64) -> Result<Option<bool>, sqlx::Error> {
        sqlx::query_scalar(
            "UPDATE notes SET is_pinned = 1 - is_pinned WHERE id = ? AND user_id = ? RETURNING is_pinned",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn delete_note(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notes WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_notes(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Notes created on or after `since`.
    pub async fn count_notes_since(&self, user_id: i64, since: NaiveDate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM notes WHERE user_id = ? AND date(created_at) >= ?")
            .bind(user_id)
            .bind(since)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn recent_notes(&self, user_id: i64, limit: i64) -> Result<Vec<Note>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
