use anyhow::{Context, Result};
use rusqlite::{Connection, params};

use super::models::CheckConfig;

/// Get the check configuration (there's only one row with id=1)
pub fn get_check_config(conn: &Connection) -> Result<CheckConfig> {
    let config = conn
        .query_row(
            "SELECT id, check_interval_hours, enabled, last_check_time, unseen_found
             FROM check_config
             WHERE id = 1",
            [],
            |row| {
                Ok(CheckConfig {
                    id: row.get(0)?,
                    check_interval_hours: row.get::<_, i64>(1)?.max(0) as u32,
                    enabled: row.get::<_, i32>(2)? != 0,
                    last_check_time: row.get(3)?,
                    unseen_found: row.get::<_, i64>(4)?.max(0) as u32,
                })
            },
        )
        .context("Failed to get check config")?;

    Ok(config)
}

/// Update how many hours pass between periodic checks
pub fn update_check_interval(conn: &Connection, hours: u32) -> Result<()> {
    conn.execute(
        "UPDATE check_config SET check_interval_hours = ?1 WHERE id = 1",
        params![hours],
    )
    .context("Failed to update check interval")?;

    Ok(())
}

/// Enable or disable periodic checks
pub fn set_check_enabled(conn: &Connection, enabled: bool) -> Result<()> {
    conn.execute(
        "UPDATE check_config SET enabled = ?1 WHERE id = 1",
        params![enabled as i32],
    )
    .context("Failed to set check enabled state")?;

    Ok(())
}

/// Update the last check time to the current time
pub fn update_last_check_time(conn: &Connection) -> Result<()> {
    conn.execute(
        "UPDATE check_config SET last_check_time = datetime('now') WHERE id = 1",
        [],
    )
    .context("Failed to update last check time")?;

    Ok(())
}

/// Add newly found movies to the unseen counter
pub fn add_unseen_found(conn: &Connection, count: u32) -> Result<()> {
    conn.execute(
        "UPDATE check_config SET unseen_found = unseen_found + ?1 WHERE id = 1",
        params![count],
    )
    .context("Failed to update unseen found counter")?;

    Ok(())
}

/// Clear the unseen counter once the user has looked
pub fn reset_unseen_found(conn: &Connection) -> Result<()> {
    conn.execute("UPDATE check_config SET unseen_found = 0 WHERE id = 1", [])
        .context("Failed to reset unseen found counter")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_database;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        conn
    }

    #[test]
    fn test_get_default_check_config() {
        let conn = setup_test_db();

        let config = get_check_config(&conn).unwrap();
        assert_eq!(config.id, 1);
        assert_eq!(config.check_interval_hours, 24);
        assert!(config.enabled);
        assert!(config.last_check_time.is_none());
        assert_eq!(config.unseen_found, 0);
    }

    #[test]
    fn test_update_check_interval() {
        let conn = setup_test_db();

        update_check_interval(&conn, 6).unwrap();

        let config = get_check_config(&conn).unwrap();
        assert_eq!(config.check_interval_hours, 6);
    }

    #[test]
    fn test_update_last_check_time() {
        let conn = setup_test_db();

        update_last_check_time(&conn).unwrap();

        let config = get_check_config(&conn).unwrap();
        assert!(config.last_check_time.is_some());
    }

    #[test]
    fn test_set_check_enabled() {
        let conn = setup_test_db();

        set_check_enabled(&conn, false).unwrap();
        assert!(!get_check_config(&conn).unwrap().enabled);

        set_check_enabled(&conn, true).unwrap();
        assert!(get_check_config(&conn).unwrap().enabled);
    }

    #[test]
    fn test_unseen_found_counter() {
        let conn = setup_test_db();

        add_unseen_found(&conn, 2).unwrap();
        add_unseen_found(&conn, 3).unwrap();
        assert_eq!(get_check_config(&conn).unwrap().unseen_found, 5);

        reset_unseen_found(&conn).unwrap();
        assert_eq!(get_check_config(&conn).unwrap().unseen_found, 0);
    }
}
