use chrono::{FixedOffset, Offset, Utc};
use std::{env, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/berrysweet.db";
/// Asia/Kolkata.
const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub utc_offset: FixedOffset,
    pub log_level: String,
}

impl Config {
    /// Reads `PORT`, `DATABASE_URL`, `BERRYSWEET_UTC_OFFSET_MINUTES` and
    /// `BERRYSWEET_LOG`, after loading a `.env` file if one exists.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let offset_minutes = env::var("BERRYSWEET_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|value| value.parse::<i32>().ok())
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        let log_level = env::var("BERRYSWEET_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            port,
            database_url,
            utc_offset: offset_from_minutes(offset_minutes),
            log_level,
        }
    }

    /// Directory that must exist before SQLite can create the database file.
    pub fn database_dir(&self) -> Option<PathBuf> {
        let path = self
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or(path);
        if path.is_empty() || path.starts_with(":memory:") {
            return None;
        }
        PathBuf::from(path)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map(PathBuf::from)
    }
}

fn offset_from_minutes(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .or_else(|| FixedOffset::east_opt(DEFAULT_UTC_OFFSET_MINUTES * 60))
        .unwrap_or_else(|| Utc.fix())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str) -> Config {
        Config {
            port: DEFAULT_PORT,
            database_url: url.to_string(),
            utc_offset: offset_from_minutes(DEFAULT_UTC_OFFSET_MINUTES),
            log_level: "info".into(),
        }
    }

    #[test]
    fn database_dir_from_url() {
        assert_eq!(
            config("sqlite://data/berrysweet.db").database_dir(),
            Some(PathBuf::from("data"))
        );
        assert_eq!(config("sqlite::memory:").database_dir(), None);
        assert_eq!(config("sqlite:app.db?mode=rwc").database_dir(), None);
    }

    #[test]
    fn invalid_offsets_fall_back() {
        assert_eq!(offset_from_minutes(330).local_minus_utc(), 330 * 60);
        assert_eq!(offset_from_minutes(100_000).local_minus_utc(), 330 * 60);
    }
}
