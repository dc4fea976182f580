use anyhow::{Context, Result};
use rusqlite::Connection;

/// Create all database tables if they don't exist
pub fn init_database(conn: &Connection) -> Result<()> {
    // Create movies table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS movies (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            imdb_id TEXT UNIQUE,
            title TEXT NOT NULL,
            year INTEGER,
            poster TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            quality TEXT,
            search_url TEXT,
            source TEXT,
            found_date TEXT,
            added_date TEXT DEFAULT (datetime('now'))
        )",
        [],
    )
    .context("Failed to create movies table")?;

    // Create check_config table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS check_config (
            id INTEGER PRIMARY KEY,
            check_interval_hours INTEGER NOT NULL DEFAULT 24,
            enabled INTEGER NOT NULL DEFAULT 1,
            last_check_time TEXT,
            unseen_found INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create check_config table")?;

    // Insert default check config if it doesn't exist
    conn.execute(
        "INSERT OR IGNORE INTO check_config (id, check_interval_hours, enabled, unseen_found)
         VALUES (1, 24, 1, 0)",
        [],
    )
    .context("Failed to insert default check config")?;

    Ok(())
}
