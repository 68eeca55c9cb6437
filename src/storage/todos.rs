use super::{Store, dated};
use crate::models::{TaskStatus, Todo, TodoFields};
use chrono::{NaiveDate, NaiveDateTime};

const TODO_COLUMNS: &str =
    "id, user_id, title, description, due_date, priority, status, created_at, completed_at";

impl Store {
    pub async fn create_todo(
        &self,
        user_id: i64,
        fields: &TodoFields,
        now: NaiveDateTime,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO todos (user_id, title, description, due_date, priority, status, created_at)
            VALUES (?, ?, ?, ?, ?, 'pending', ?)
            "#,
        )
        .bind(user_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(fields.priority.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get_todo(&self, user_id: i64, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE id = ? AND user_id = ?"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Pending first, then by priority, newest first.
    pub async fn list_todos(&self, user_id: i64) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"
            SELECT {TODO_COLUMNS} FROM todos
            WHERE user_id = ?
            ORDER BY
                CASE status WHEN 'pending' THEN 1 ELSE 2 END,
                CASE priority WHEN 'high' THEN 1 WHEN 'medium' THEN 2 ELSE 3 END,
                created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn update_todo(
        &self,
        user_id: i64,
        id: i64,
        fields: &TodoFields,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE todos SET title = ?, description = ?, due_date = ?, priority = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(fields.due_date)
        .bind(fields.priority.as_str())
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Completing stamps `completed_at`; reopening clears it.
    pub async fn set_todo_status(
        &self,
        user_id: i64,
        id: i64,
        status: TaskStatus,
        now: NaiveDateTime,
    ) -> Result<bool, sqlx::Error> {
        let completed_at = match status {
            TaskStatus::Completed => Some(now),
            TaskStatus::Pending => None,
        };
        let result = sqlx::query(
            "UPDATE todos SET status = ?, completed_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(status.as_str())
        .bind(completed_at)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_todo(&self, user_id: i64, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_todos(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_todos_with_status(
        &self,
        user_id: i64,
        status: TaskStatus,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = ? AND status = ?")
            .bind(user_id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
    }

    pub async fn count_completed_on(&self, user_id: i64, day: NaiveDate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM todos WHERE user_id = ? AND status = 'completed' AND date(completed_at) = ?",
        )
        .bind(user_id)
        .bind(day)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn count_due_on(&self, user_id: i64, day: NaiveDate) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM todos WHERE user_id = ? AND date(due_date) = ?")
            .bind(user_id)
            .bind(day)
            .fetch_one(&self.pool)
            .await
    }

    pub async fn recent_todos(&self, user_id: i64, limit: i64) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? ORDER BY created_at DESC, id DESC LIMIT ?"
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }

    /// Pending tasks due on `day` or carrying no due date.
    pub async fn tasks_for_day(&self, user_id: i64, day: NaiveDate) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"
            SELECT {TODO_COLUMNS} FROM todos
            WHERE user_id = ? AND status = 'pending'
              AND (date(due_date) = ? OR due_date IS NULL)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .bind(day)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn todos_created_since(
        &self,
        user_id: i64,
        since: NaiveDateTime,
    ) -> Result<Vec<Todo>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = ? AND created_at >= ? ORDER BY created_at DESC, id DESC"
        ))
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn todos_created_per_day(
        &self,
        user_id: i64,
        since: NaiveDate,
    ) -> Result<Vec<(NaiveDate, i64)>, sqlx::Error> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT date(created_at) AS day, COUNT(*) FROM todos
            WHERE user_id = ? AND date(created_at) >= ?
            GROUP BY day
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(dated(rows))
    }
}

#[cfg(test)]
mod tests {
    use crate::models::{Priority, TaskStatus, TodoFields};
    use crate::storage::testing::{at, day, store, user};

    fn fields(title: &str, priority: Priority) -> TodoFields {
        TodoFields {
            title: title.to_string(),
            description: String::new(),
            due_date: None,
            priority,
        }
    }

    #[tokio::test]
    async fn other_users_cannot_touch_a_todo() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        let intruder = user(&store, "intruder").await;
        let now = at("2024-01-10 09:00:00");

        let id = store
            .create_todo(owner, &fields("Pay rent", Priority::High), now)
            .await
            .unwrap();

        assert!(store.get_todo(intruder, id).await.unwrap().is_none());
        assert!(!store
            .update_todo(intruder, id, &fields("Hijacked", Priority::Low))
            .await
            .unwrap());
        assert!(!store
            .set_todo_status(intruder, id, TaskStatus::Completed, now)
            .await
            .unwrap());
        assert!(!store.delete_todo(intruder, id).await.unwrap());

        let todo = store.get_todo(owner, id).await.unwrap().unwrap();
        assert_eq!(todo.title, "Pay rent");
        assert_eq!(todo.status, TaskStatus::Pending);
    }

    #[tokio::test]
    async fn completing_and_reopening_tracks_completed_at() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        let now = at("2024-01-10 09:00:00");
        let id = store
            .create_todo(owner, &fields("Stretch", Priority::Low), now)
            .await
            .unwrap();

        store
            .set_todo_status(owner, id, TaskStatus::Completed, now)
            .await
            .unwrap();
        assert_eq!(store.count_completed_on(owner, day("2024-01-10")).await.unwrap(), 1);
        assert_eq!(
            store.get_todo(owner, id).await.unwrap().unwrap().completed_at,
            Some(now)
        );

        store
            .set_todo_status(owner, id, TaskStatus::Pending, now)
            .await
            .unwrap();
        assert_eq!(store.count_completed_on(owner, day("2024-01-10")).await.unwrap(), 0);
        assert_eq!(
            store
                .count_todos_with_status(owner, TaskStatus::Pending)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn listing_orders_pending_high_priority_first() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        let low = store
            .create_todo(owner, &fields("low", Priority::Low), at("2024-01-10 09:00:00"))
            .await
            .unwrap();
        let high = store
            .create_todo(owner, &fields("high", Priority::High), at("2024-01-09 09:00:00"))
            .await
            .unwrap();
        let done = store
            .create_todo(owner, &fields("done", Priority::High), at("2024-01-10 10:00:00"))
            .await
            .unwrap();
        store
            .set_todo_status(owner, done, TaskStatus::Completed, at("2024-01-10 11:00:00"))
            .await
            .unwrap();

        let ids: Vec<i64> = store
            .list_todos(owner)
            .await
            .unwrap()
            .iter()
            .map(|todo| todo.id)
            .collect();
        assert_eq!(ids, vec![high, low, done]);
    }

    #[tokio::test]
    async fn created_per_day_groups_by_calendar_day() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        for ts in ["2024-01-08 09:00:00", "2024-01-08 21:00:00", "2024-01-10 07:00:00"] {
            store
                .create_todo(owner, &fields("t", Priority::Medium), at(ts))
                .await
                .unwrap();
        }
        let mut rows = store
            .todos_created_per_day(owner, day("2024-01-04"))
            .await
            .unwrap();
        rows.sort();
        assert_eq!(rows, vec![(day("2024-01-08"), 2), (day("2024-01-10"), 1)]);
    }
}
