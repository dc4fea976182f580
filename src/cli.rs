use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::search::normalize::normalize_title;

#[derive(Parser, Debug)]
#[command(
    name = "torrent-hunter",
    version,
    about = "Watches public torrent indexes for quality movie releases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API and the periodic checker
    Serve,
    /// Search the sources for one movie and print the verdict
    Search {
        #[arg(value_parser = parse_title)]
        title: String,
        #[arg(long)]
        year: Option<u16>,
        #[arg(long, default_value_t = false, help = "Try every source, not only the first")]
        all: bool,
    },
    /// List the registered sources
    Sources,
    /// Check every movie on the list once and exit
    Check,
    /// Add a movie to the list without searching for it
    Add {
        #[arg(value_parser = parse_title)]
        title: String,
        #[arg(long)]
        year: Option<u16>,
        #[arg(long, help = "IMDb id or title URL")]
        imdb: Option<String>,
    },
    /// Add the titled IMDb links found in a markdown file
    Import { file: PathBuf },
    /// Print the movie list as JSON
    List,
}

/// Movie titles must keep some letters or digits once punctuation is stripped
fn parse_title(raw: &str) -> Result<String, String> {
    let title = raw.trim();
    if normalize_title(title).is_empty() {
        return Err(format!("'{}' has no letters or digits", raw));
    }
    Ok(title.to_string())
}

impl Cli {
    pub fn into_command(self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}
