//! Persistence gateway over SQLite.
//!
//! Layout mirrors the pages: one file per entity family, each adding methods
//! to [`Store`]. Every method takes the owning `user_id` and filters on it;
//! ids belonging to another user behave as missing rows.

mod expenses;
mod focus;
mod habits;
mod journals;
mod notes;
pub mod schema;
mod todos;
mod users;

pub use schema::SQLITE_INIT;

use crate::stats::parse_date_key;
use chrono::NaiveDate;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens the pool, creating the database file when missing, and applies
    /// the schema.
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Each in-memory connection is its own database; pin the pool to one.
        let in_memory = database_url.contains(":memory:");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(8)
        };

        let pool = pool_options.connect_with(options).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        info!(database_url, "database ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn init_schema(&self) -> Result<(), sqlx::Error> {
        // sqlx::query runs one statement at a time.
        for stmt in SQLITE_INIT.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// Turns `(YYYY-MM-DD, value)` rows from a `GROUP BY date(..)` into typed
/// pairs, dropping keys SQLite could not normalise.
fn dated<V>(rows: Vec<(String, V)>) -> Vec<(NaiveDate, V)> {
    rows.into_iter()
        .filter_map(|(key, value)| parse_date_key(&key).map(|date| (date, value)))
        .collect()
}
