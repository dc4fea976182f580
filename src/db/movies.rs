use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::models::{Movie, MovieStatus, NewMovie, StatusCounts};
use crate::search::SourceResult;

const MOVIE_COLUMNS: &str = "id, imdb_id, title, year, poster, status, quality, search_url,
                             source, found_date, added_date";

fn movie_from_row(row: &Row<'_>) -> rusqlite::Result<Movie> {
    let status: String = row.get(5)?;
    Ok(Movie {
        id: row.get(0)?,
        imdb_id: row.get(1)?,
        title: row.get(2)?,
        year: row.get(3)?,
        poster: row.get(4)?,
        status: MovieStatus::from_str(&status).unwrap_or(MovieStatus::Pending),
        quality: row.get(6)?,
        search_url: row.get(7)?,
        source: row.get(8)?,
        found_date: row.get(9)?,
        added_date: row.get(10)?,
    })
}

/// Get all movies in the order they were added
pub fn get_all_movies(conn: &Connection) -> Result<Vec<Movie>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {} FROM movies ORDER BY id", MOVIE_COLUMNS))
        .context("Failed to prepare get_all_movies query")?;

    let movies = stmt
        .query_map([], movie_from_row)
        .context("Failed to execute get_all_movies query")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect movies")?;

    Ok(movies)
}

/// Get a single movie by ID
pub fn get_movie(conn: &Connection, id: i64) -> Result<Option<Movie>> {
    let movie = conn
        .query_row(
            &format!("SELECT {} FROM movies WHERE id = ?1", MOVIE_COLUMNS),
            [id],
            movie_from_row,
        )
        .optional()
        .context("Failed to execute get_movie query")?;

    Ok(movie)
}

/// Check whether a movie is already on the list
///
/// Matches by IMDb id when one is given, otherwise by title and year.
pub fn movie_exists(conn: &Connection, movie: &NewMovie) -> Result<bool> {
    let exists: Option<i32> = match movie.imdb_id.as_deref() {
        Some(imdb_id) => conn
            .query_row(
                "SELECT 1 FROM movies WHERE imdb_id = ?1 LIMIT 1",
                params![imdb_id],
                |row| row.get(0),
            )
            .optional(),
        None => conn
            .query_row(
                "SELECT 1 FROM movies WHERE lower(title) = lower(?1) AND year IS ?2 LIMIT 1",
                params![movie.title.trim(), movie.year],
                |row| row.get(0),
            )
            .optional(),
    }
    .context("Failed to check for existing movie")?;

    Ok(exists.is_some())
}

/// Insert a new pending movie, returning its id
pub fn insert_movie(conn: &Connection, movie: &NewMovie) -> Result<i64> {
    conn.execute(
        "INSERT INTO movies (imdb_id, title, year, poster, status)
         VALUES (?1, ?2, ?3, ?4, 'pending')",
        params![movie.imdb_id, movie.title.trim(), movie.year, movie.poster],
    )
    .context("Failed to insert movie")?;

    Ok(conn.last_insert_rowid())
}

/// Delete a movie by ID, returning whether it existed
pub fn delete_movie(conn: &Connection, id: i64) -> Result<bool> {
    let deleted = conn
        .execute("DELETE FROM movies WHERE id = ?1", [id])
        .context("Failed to delete movie")?;

    Ok(deleted > 0)
}

/// Count movies per status
pub fn count_by_status(conn: &Connection) -> Result<StatusCounts> {
    let mut stmt = conn
        .prepare("SELECT status, COUNT(*) FROM movies GROUP BY status")
        .context("Failed to prepare count_by_status query")?;

    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))
        .context("Failed to execute count_by_status query")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .context("Failed to collect status counts")?;

    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        match MovieStatus::from_str(&status) {
            Some(MovieStatus::Found) => counts.found += count,
            Some(MovieStatus::CamTs) => counts.cam_ts += count,
            _ => counts.pending += count,
        }
    }

    Ok(counts)
}

/// What a search result means for a stored movie
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Found {
        quality: String,
        search_url: String,
        source: String,
    },
    LowQuality {
        search_url: String,
        source: String,
    },
    NotFound,
}

impl CheckOutcome {
    pub fn from_result(result: &SourceResult) -> Self {
        match result.quality_tier {
            Some(tier) if result.found => CheckOutcome::Found {
                quality: tier.to_string(),
                search_url: result.search_url.clone(),
                source: result.source.clone(),
            },
            _ if result.has_low_quality => CheckOutcome::LowQuality {
                search_url: result.search_url.clone(),
                source: result.source.clone(),
            },
            _ => CheckOutcome::NotFound,
        }
    }
}

/// Store a check outcome on a movie
///
/// A miss resets the movie to pending when `reset_on_miss` is set and leaves it
/// untouched otherwise.
pub fn apply_outcome(
    conn: &Connection,
    id: i64,
    outcome: &CheckOutcome,
    reset_on_miss: bool,
) -> Result<()> {
    write_outcome(conn, id, outcome, reset_on_miss, false)
}

/// Store a batch of outcomes in one transaction
///
/// Misses are left untouched, and so are movies marked found since the batch
/// read the list.
pub fn apply_outcomes(conn: &mut Connection, outcomes: &[(i64, CheckOutcome)]) -> Result<()> {
    let tx = conn
        .transaction()
        .context("Failed to start outcome transaction")?;

    for (id, outcome) in outcomes {
        write_outcome(&tx, *id, outcome, false, true)?;
    }

    tx.commit().context("Failed to commit outcomes")?;

    Ok(())
}

fn write_outcome(
    conn: &Connection,
    id: i64,
    outcome: &CheckOutcome,
    reset_on_miss: bool,
    keep_found: bool,
) -> Result<()> {
    match outcome {
        CheckOutcome::Found {
            quality,
            search_url,
            source,
        } => {
            conn.execute(
                "UPDATE movies SET status = 'found', quality = ?2, search_url = ?3, source = ?4,
                        found_date = datetime('now')
                 WHERE id = ?1 AND (?5 = 0 OR status != 'found')",
                params![id, quality, search_url, source, keep_found],
            )
            .context("Failed to mark movie as found")?;
        }
        CheckOutcome::LowQuality { search_url, source } => {
            conn.execute(
                "UPDATE movies SET status = 'cam_ts', quality = NULL, search_url = ?2, source = ?3,
                        found_date = NULL
                 WHERE id = ?1 AND (?4 = 0 OR status != 'found')",
                params![id, search_url, source, keep_found],
            )
            .context("Failed to mark movie as cam/ts")?;
        }
        CheckOutcome::NotFound if reset_on_miss => {
            conn.execute(
                "UPDATE movies SET status = 'pending', quality = NULL, found_date = NULL
                 WHERE id = ?1",
                params![id],
            )
            .context("Failed to reset movie to pending")?;
        }
        CheckOutcome::NotFound => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema::init_database;
    use crate::search::quality::QualityTier;

    fn setup_test_db() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_database(&conn).unwrap();
        conn
    }

    fn new_movie(title: &str, year: Option<u16>, imdb_id: Option<&str>) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            year,
            imdb_id: imdb_id.map(|s| s.to_string()),
            poster: None,
        }
    }

    fn found_result() -> SourceResult {
        SourceResult {
            found: true,
            has_low_quality: false,
            quality_tier: Some(QualityTier::BluRay),
            search_url: "https://tpb.test/search/dune/1/99/0".to_string(),
            source: "TPB".to_string(),
        }
    }

    #[test]
    fn test_insert_and_get_movie() {
        let conn = setup_test_db();

        let id = insert_movie(&conn, &new_movie("Dune", Some(2021), Some("tt1160419"))).unwrap();

        let movie = get_movie(&conn, id).unwrap().unwrap();
        assert_eq!(movie.title, "Dune");
        assert_eq!(movie.year, Some(2021));
        assert_eq!(movie.imdb_id.as_deref(), Some("tt1160419"));
        assert_eq!(movie.status, MovieStatus::Pending);
        assert!(movie.added_date.is_some());
    }

    #[test]
    fn test_get_all_movies_in_insert_order() {
        let conn = setup_test_db();

        insert_movie(&conn, &new_movie("Zootopia 2", Some(2025), None)).unwrap();
        insert_movie(&conn, &new_movie("Arrival", Some(2016), None)).unwrap();

        let titles: Vec<String> = get_all_movies(&conn)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["Zootopia 2", "Arrival"]);
    }

    #[test]
    fn test_movie_exists() {
        let conn = setup_test_db();

        insert_movie(&conn, &new_movie("Dune", Some(2021), Some("tt1160419"))).unwrap();
        insert_movie(&conn, &new_movie("Arrival", None, None)).unwrap();

        assert!(movie_exists(&conn, &new_movie("Other", None, Some("tt1160419"))).unwrap());
        assert!(!movie_exists(&conn, &new_movie("Dune", Some(2021), Some("tt0000001"))).unwrap());
        assert!(movie_exists(&conn, &new_movie("arrival", None, None)).unwrap());
        assert!(!movie_exists(&conn, &new_movie("Arrival", Some(2016), None)).unwrap());
    }

    #[test]
    fn test_delete_movie() {
        let conn = setup_test_db();

        let id = insert_movie(&conn, &new_movie("To Delete", None, None)).unwrap();
        assert!(delete_movie(&conn, id).unwrap());
        assert!(get_movie(&conn, id).unwrap().is_none());
        assert!(!delete_movie(&conn, id).unwrap());
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(
            CheckOutcome::from_result(&found_result()),
            CheckOutcome::Found {
                quality: "BluRay".to_string(),
                search_url: "https://tpb.test/search/dune/1/99/0".to_string(),
                source: "TPB".to_string(),
            }
        );

        let low = SourceResult {
            has_low_quality: true,
            search_url: "u".to_string(),
            source: "1337x".to_string(),
            ..Default::default()
        };
        assert!(matches!(CheckOutcome::from_result(&low), CheckOutcome::LowQuality { .. }));

        assert_eq!(CheckOutcome::from_result(&SourceResult::default()), CheckOutcome::NotFound);
    }

    #[test]
    fn test_apply_found_then_reset() {
        let conn = setup_test_db();
        let id = insert_movie(&conn, &new_movie("Dune", Some(2021), None)).unwrap();

        apply_outcome(&conn, id, &CheckOutcome::from_result(&found_result()), true).unwrap();
        let movie = get_movie(&conn, id).unwrap().unwrap();
        assert_eq!(movie.status, MovieStatus::Found);
        assert_eq!(movie.quality.as_deref(), Some("BluRay"));
        assert_eq!(movie.source.as_deref(), Some("TPB"));
        assert!(movie.found_date.is_some());

        apply_outcome(&conn, id, &CheckOutcome::NotFound, true).unwrap();
        let movie = get_movie(&conn, id).unwrap().unwrap();
        assert_eq!(movie.status, MovieStatus::Pending);
        assert!(movie.quality.is_none());
    }

    #[test]
    fn test_apply_outcomes_batch() {
        let mut conn = setup_test_db();
        let dune = insert_movie(&conn, &new_movie("Dune", Some(2021), None)).unwrap();
        let zoo = insert_movie(&conn, &new_movie("Zootopia 2", Some(2025), None)).unwrap();
        let arrival = insert_movie(&conn, &new_movie("Arrival", Some(2016), None)).unwrap();

        apply_outcome(&conn, arrival, &CheckOutcome::from_result(&found_result()), true).unwrap();

        apply_outcomes(
            &mut conn,
            &[
                (dune, CheckOutcome::from_result(&found_result())),
                (
                    zoo,
                    CheckOutcome::LowQuality {
                        search_url: "https://x.test".to_string(),
                        source: "1337x".to_string(),
                    },
                ),
                (arrival, CheckOutcome::NotFound),
            ],
        )
        .unwrap();

        assert_eq!(get_movie(&conn, dune).unwrap().unwrap().status, MovieStatus::Found);
        assert_eq!(get_movie(&conn, zoo).unwrap().unwrap().status, MovieStatus::CamTs);
        // Misses in a batch leave the record alone
        assert_eq!(get_movie(&conn, arrival).unwrap().unwrap().status, MovieStatus::Found);

        let counts = count_by_status(&conn).unwrap();
        assert_eq!(
            counts,
            StatusCounts {
                pending: 0,
                found: 2,
                cam_ts: 1
            }
        );
    }

    #[test]
    fn test_batch_does_not_downgrade_found_movie() {
        let mut conn = setup_test_db();
        let id = insert_movie(&conn, &new_movie("Zootopia 2", Some(2025), None)).unwrap();

        // Single check lands while the batch is still searching
        apply_outcome(&conn, id, &CheckOutcome::from_result(&found_result()), true).unwrap();
        let found_date = get_movie(&conn, id).unwrap().unwrap().found_date;

        apply_outcomes(
            &mut conn,
            &[(
                id,
                CheckOutcome::LowQuality {
                    search_url: "https://x.test".to_string(),
                    source: "1337x".to_string(),
                },
            )],
        )
        .unwrap();

        let movie = get_movie(&conn, id).unwrap().unwrap();
        assert_eq!(movie.status, MovieStatus::Found);
        assert_eq!(movie.quality.as_deref(), Some("BluRay"));
        assert_eq!(movie.source.as_deref(), Some("TPB"));
        assert_eq!(movie.found_date, found_date);
    }

    #[test]
    fn test_single_check_still_overwrites_found() {
        let conn = setup_test_db();
        let id = insert_movie(&conn, &new_movie("Dune", Some(2021), None)).unwrap();
        apply_outcome(&conn, id, &CheckOutcome::from_result(&found_result()), true).unwrap();

        let low = CheckOutcome::LowQuality {
            search_url: "https://x.test".to_string(),
            source: "1337x".to_string(),
        };
        apply_outcome(&conn, id, &low, true).unwrap();

        assert_eq!(get_movie(&conn, id).unwrap().unwrap().status, MovieStatus::CamTs);
    }
}
