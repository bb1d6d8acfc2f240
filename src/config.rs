//! Runtime configuration loaded from environment variables.

use std::path::PathBuf;

use anyhow::Result;

use crate::db::Database;

const DEFAULT_PORT: u16 = 3000;

/// Server and navigation settings.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// SQLite database file (from INVNAV_DB_PATH). Defaults to the platform data dir.
    pub db_path: Option<PathBuf>,
    /// HTTP port (from INVNAV_PORT).
    pub port: u16,
    /// Children fetched per tree expansion (from INVNAV_PAGE_LIMIT). Zero fetches all.
    pub page_limit: i64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = lookup("INVNAV_DB_PATH").map(PathBuf::from);

        let port = lookup("INVNAV_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let page_limit = lookup("INVNAV_PAGE_LIMIT")
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|limit| *limit >= 0)
            .unwrap_or(0);

        Self {
            db_path,
            port,
            page_limit,
        }
    }

    /// Open (and migrate) the configured database.
    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.db_path {
            Some(path) => Database::open(path.clone())?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: None,
            port: DEFAULT_PORT,
            page_limit: 0,
        }
    }
}
