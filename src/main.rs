mod api;
mod cli;
mod config;
mod db;
mod search;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::api::AppState;
use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::db::{Db, import::parse_imdb_id, models::NewMovie};
use crate::search::{MovieQuery, SourceRegistry};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "torrent_hunter=info,tower_http=info".into()),
        )
        .init();

    let command = Cli::parse().into_command();
    let config = AppConfig::from_env()?;
    let registry = SourceRegistry::from_config(&config)?;

    match command {
        Commands::Serve => serve(&config, registry).await,
        Commands::Search { title, year, all } => {
            let query = MovieQuery::new(title, year);
            let result = if all {
                registry.search_all(&query).await
            } else {
                registry.search_one(&query).await
            };
            print_json(&result)
        }
        Commands::Sources => print_json(&registry.list_sources()),
        Commands::Check => {
            let db = Db::open(&config.database_path)?;
            let summary = search::check_all_movies(&db, &registry).await?;
            print_json(&summary)
        }
        Commands::Add { title, year, imdb } => {
            let db = Db::open(&config.database_path)?;
            let imdb_id = match imdb {
                Some(raw) => Some(
                    parse_imdb_id(&raw).with_context(|| format!("Invalid IMDb id: {}", raw))?,
                ),
                None => None,
            };
            let movie = NewMovie {
                title,
                year,
                imdb_id,
                poster: None,
            };
            match add_movie(&db, movie.clone()).await? {
                Some(id) => println!("Added {} as #{}", movie.title, id),
                None => println!("{} is already on the list", movie.title),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let db = Db::open(&config.database_path)?;
            import_file(&db, &file).await
        }
        Commands::List => {
            let db = Db::open(&config.database_path)?;
            let movies = db.with_db(db::get_all_movies).await?;
            print_json(&movies)
        }
    }
}

async fn serve(config: &AppConfig, registry: SourceRegistry) -> Result<()> {
    let db = Db::open(&config.database_path)?;
    tracing::info!("Database ready at {}", config.database_path);

    for source in registry.list_sources() {
        tracing::info!("Registered source: {} ({})", source.name, source.base_url);
    }

    tokio::spawn(search::run_checker(db.clone(), registry.clone()));

    let app = api::router(Arc::new(AppState { db, registry }));
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;

    tracing::info!("Listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await.context("HTTP server failed")?;

    Ok(())
}

/// Insert a movie unless it is already listed, returning the new id
async fn add_movie(db: &Db, movie: NewMovie) -> Result<Option<i64>> {
    db.with_db(move |conn| {
        if db::movies::movie_exists(conn, &movie)? {
            return Ok(None);
        }
        db::insert_movie(conn, &movie).map(Some)
    })
    .await
}

async fn import_file(db: &Db, path: &Path) -> Result<()> {
    let markdown = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let entries = db::import::parse_imdb_links(&markdown);
    let (mut added, mut existing, mut skipped) = (0, 0, 0);

    for entry in entries {
        let Some(title) = entry.title else {
            tracing::warn!("Skipping {}: no title next to the link", entry.imdb_id);
            skipped += 1;
            continue;
        };

        let movie = NewMovie {
            title,
            year: entry.year,
            imdb_id: Some(entry.imdb_id),
            poster: None,
        };
        match add_movie(db, movie).await? {
            Some(_) => added += 1,
            None => existing += 1,
        }
    }

    println!(
        "Imported {} movie(s), {} already listed, {} skipped",
        added, existing, skipped
    );

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
