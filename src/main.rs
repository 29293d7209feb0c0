use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marquee::app::AppContext;
use marquee::cli::{commands, Cli, Commands};
use marquee::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, cli.db)?;

    match cli.command {
        Commands::Trending => {
            commands::list_trending(&ctx).await?;
        }
        Commands::Popular => {
            commands::list_popular(&ctx).await?;
        }
        Commands::Search { query, select } => {
            commands::search_movies(&ctx, &query, select).await?;
        }
        Commands::Show { id, trailer } => {
            commands::show_movie(&ctx, id, trailer).await?;
        }
        Commands::Favorite { id } => {
            commands::toggle_favorite(&ctx, id)?;
        }
        Commands::Favorites => {
            commands::list_favorites(&ctx).await?;
        }
        Commands::History { clear } => {
            commands::show_history(&ctx, clear)?;
        }
        Commands::Login { username, password } => {
            commands::login(&ctx, &username, &password)?;
        }
        Commands::Logout => {
            commands::logout(&ctx)?;
        }
        Commands::Whoami => {
            commands::whoami(&ctx)?;
        }
        Commands::Theme { mode } => {
            commands::theme(&ctx, mode.as_deref())?;
        }
        Commands::Tui => {
            marquee::tui::run(Arc::new(ctx)).await?;
        }
    }

    Ok(())
}
