pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "A terminal movie explorer", long_about = None)]
pub struct Cli {
    /// Path to the state database (default: platform data dir)
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List movies trending this week
    Trending,
    /// List currently popular movies
    Popular,
    /// Search movies and show the top suggestions
    Search {
        /// Title to search for
        query: String,
        /// Select suggestion N (1-based): record it in the search history
        /// and show its details
        #[arg(long)]
        select: Option<usize>,
    },
    /// Show details for a movie and count the view
    Show {
        /// TMDB movie id
        id: i64,
        /// Open the trailer in the browser
        #[arg(long)]
        trailer: bool,
    },
    /// Toggle a movie in the favorites
    Favorite {
        /// TMDB movie id
        id: i64,
    },
    /// List favorite movies
    Favorites,
    /// Show the search history
    History {
        /// Clear the search history instead
        #[arg(long)]
        clear: bool,
    },
    /// Log in (mock credentials)
    Login {
        username: String,
        password: String,
    },
    /// Log out
    Logout,
    /// Show the current session
    Whoami,
    /// Show or set the color theme
    Theme {
        /// "light" or "dark"; omit to print the current theme
        mode: Option<String>,
    },
    /// Launch the TUI
    Tui,
}
