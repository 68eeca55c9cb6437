use super::{Store, dated};
use crate::models::FocusGoal;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx::SqliteConnection;

const FOCUS_COLUMNS: &str =
    "id, user_id, goal_date, target_sessions, completed_sessions, created_at";

/// Target given to a day's goal before the user sets one.
pub const DEFAULT_TARGET_SESSIONS: i64 = 1;

impl Store {
    /// Returns the goal for `day`, creating it with the default target when
    /// absent. Concurrent callers converge on the same row.
    pub async fn focus_goal_for(
        &self,
        user_id: i64,
        day: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<FocusGoal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        ensure_goal(&mut *tx, user_id, day, now).await?;
        let goal = sqlx::query_as(&format!(
            "SELECT {FOCUS_COLUMNS} FROM focus_goals WHERE user_id = ? AND goal_date = ?"
        ))
        .bind(user_id)
        .bind(day)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(goal)
    }

    /// Reads the goal for `day` without creating one.
    pub async fn get_focus_goal(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<FocusGoal>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {FOCUS_COLUMNS} FROM focus_goals WHERE user_id = ? AND goal_date = ?"
        ))
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn set_focus_target(
        &self,
        user_id: i64,
        day: NaiveDate,
        target: i64,
        now: NaiveDateTime,
    ) -> Result<FocusGoal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        ensure_goal(&mut *tx, user_id, day, now).await?;
        let goal = sqlx::query_as(&format!(
            r#"
            UPDATE focus_goals SET target_sessions = ?
            WHERE user_id = ? AND goal_date = ?
            RETURNING {FOCUS_COLUMNS}
            "#
        ))
        .bind(target)
        .bind(user_id)
        .bind(day)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(goal)
    }

    /// Moves the completed count by `delta`, never below zero.
    pub async fn adjust_focus_sessions(
        &self,
        user_id: i64,
        day: NaiveDate,
        delta: i64,
        now: NaiveDateTime,
    ) -> Result<FocusGoal, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        ensure_goal(&mut *tx, user_id, day, now).await?;
        let goal = sqlx::query_as(&format!(
            r#"
            UPDATE focus_goals SET completed_sessions = MAX(0, completed_sessions + ?)
            WHERE user_id = ? AND goal_date = ?
            RETURNING {FOCUS_COLUMNS}
            "#
        ))
        .bind(delta)
        .bind(user_id)
        .bind(day)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(goal)
    }

    /// Every recorded day with whether its target was met.
    pub async fn focus_days(&self, user_id: i64) -> Result<Vec<(NaiveDate, bool)>, sqlx::Error> {
        let rows: Vec<(String, bool)> = sqlx::query_as(
            r#"
            SELECT goal_date, completed_sessions >= target_sessions FROM focus_goals
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(dated(rows))
    }
}

async fn ensure_goal(
    conn: &mut SqliteConnection,
    user_id: i64,
    day: NaiveDate,
    now: NaiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO focus_goals (user_id, goal_date, target_sessions, completed_sessions, created_at)
        VALUES (?, ?, ?, 0, ?)
        ON CONFLICT(user_id, goal_date) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(day)
    .bind(DEFAULT_TARGET_SESSIONS)
    .bind(now)
    .execute(conn)
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::storage::testing::{at, day, store, user};

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        let today = day("2024-01-10");

        let first = store
            .focus_goal_for(owner, today, at("2024-01-10 08:00:00"))
            .await
            .unwrap();
        let second = store
            .focus_goal_for(owner, today, at("2024-01-10 09:00:00"))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.target_sessions, 1);
        assert_eq!(second.created_at, at("2024-01-10 08:00:00"));

        let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM focus_goals WHERE user_id = ?")
            .bind(owner)
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(rows, 1);
        assert!(store.get_focus_goal(owner, day("2024-01-09")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sessions_never_go_negative() {
        let store = store().await;
        let owner = user(&store, "owner").await;
        let today = day("2024-01-10");
        let now = at("2024-01-10 08:00:00");

        let goal = store.adjust_focus_sessions(owner, today, -1, now).await.unwrap();
        assert_eq!(goal.completed_sessions, 0);

        store.set_focus_target(owner, today, 2, now).await.unwrap();
        store.adjust_focus_sessions(owner, today, 1, now).await.unwrap();
        let goal = store.adjust_focus_sessions(owner, today, 1, now).await.unwrap();
        assert_eq!(goal.completed_sessions, 2);
        assert_eq!(goal.target_sessions, 2);

        let days = store.focus_days(owner).await.unwrap();
        assert_eq!(days, vec![(today, true)]);
    }
}
