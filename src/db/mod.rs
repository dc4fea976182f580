pub mod config;
pub mod import;
pub mod movies;
pub mod schema;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tokio::sync::Mutex;

/// Shared database handle wrapping one SQLite connection
#[derive(Clone)]
pub struct Db {
    conn: Arc<Mutex<Connection>>,
}

impl Db {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        Self::from_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute("PRAGMA foreign_keys = ON", [])
            .context("Failed to enable foreign keys")?;
        schema::init_database(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Execute a database operation while holding the connection lock
    pub async fn with_db<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().await;
        f(&conn)
    }

    /// Execute a database operation that requires mutable access (transactions)
    pub async fn with_db_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().await;
        f(&mut conn)
    }
}

// Re-export commonly used types and functions
pub use config::{
    add_unseen_found, get_check_config, reset_unseen_found, set_check_enabled,
    update_check_interval, update_last_check_time,
};
pub use movies::{
    CheckOutcome, apply_outcome, apply_outcomes, count_by_status, delete_movie, get_all_movies,
    get_movie, insert_movie,
};

/// Data models for the database layer
pub mod models {
    use serde::{Deserialize, Serialize};

    /// Where a movie stands in the hunt
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum MovieStatus {
        Pending,
        Found,
        CamTs,
    }

    impl MovieStatus {
        pub fn from_str(s: &str) -> Option<Self> {
            match s {
                "pending" => Some(MovieStatus::Pending),
                "found" => Some(MovieStatus::Found),
                "cam_ts" => Some(MovieStatus::CamTs),
                _ => None,
            }
        }
    }

    /// A movie on the watch list
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Movie {
        pub id: i64,
        pub imdb_id: Option<String>,
        pub title: String,
        pub year: Option<u16>,
        pub poster: Option<String>,
        pub status: MovieStatus,
        pub quality: Option<String>,
        pub search_url: Option<String>,
        pub source: Option<String>,
        pub found_date: Option<String>,
        pub added_date: Option<String>,
    }

    /// Input for adding a movie
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct NewMovie {
        pub title: String,
        pub year: Option<u16>,
        pub imdb_id: Option<String>,
        pub poster: Option<String>,
    }

    /// Number of movies per status
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
    pub struct StatusCounts {
        pub pending: u32,
        pub found: u32,
        pub cam_ts: u32,
    }

    /// Periodic check configuration
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct CheckConfig {
        pub id: u32,
        pub check_interval_hours: u32,
        pub enabled: bool,
        pub last_check_time: Option<String>,
        /// Movies found since the user last looked
        pub unseen_found: u32,
    }

    impl Default for CheckConfig {
        fn default() -> Self {
            Self {
                id: 1,
                check_interval_hours: 24,
                enabled: true,
                last_check_time: None,
                unseen_found: 0,
            }
        }
    }
}
