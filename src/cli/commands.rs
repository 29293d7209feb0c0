use reqwest::StatusCode;
use tracing::warn;

use crate::api::MovieDetails;
use crate::app::{AppContext, MarqueeError, Result};
use crate::domain::{Movie, MovieId, ThemeMode};
use crate::store::StateStore;

/// Mock credential check, kept outside the store: the store records login
/// state, it never validates it.
pub fn verify_credentials(username: &str, password: &str) -> bool {
    username == "admin" && password == "admin"
}

pub async fn list_trending(ctx: &AppContext) -> Result<()> {
    let movies = ctx.api()?.trending().await?;
    print_movie_list(ctx, &movies, "No trending movies");
    Ok(())
}

pub async fn list_popular(ctx: &AppContext) -> Result<()> {
    let movies = ctx.api()?.popular().await?;
    print_movie_list(ctx, &movies, "No popular movies");
    Ok(())
}

pub async fn search_movies(ctx: &AppContext, query: &str, select: Option<usize>) -> Result<()> {
    let results = ctx.api()?.search(query).await?;

    if results.is_empty() {
        println!("No results for: {}", query);
        return Ok(());
    }

    // The newest successful search always updates the last-searched movie;
    // losing that update is not worth failing the search over.
    if let Err(e) = ctx.store.set_last_searched(&results[0]) {
        warn!(error = %e, "failed to persist last searched movie");
    }

    let suggestions: Vec<&Movie> = results.iter().take(5).collect();

    match select {
        None => {
            for (i, movie) in suggestions.iter().enumerate() {
                println!("{}. {} ({})", i + 1, movie.display_title(), movie.year_label());
            }
        }
        Some(n) => {
            let movie = *suggestions.get(n.checked_sub(1).ok_or_else(|| {
                MarqueeError::Other("selection is 1-based".into())
            })?)
            .ok_or_else(|| {
                MarqueeError::Other(format!(
                    "selection {} out of range (1-{})",
                    n,
                    suggestions.len()
                ))
            })?;

            ctx.store.push_search_history(movie)?;
            ctx.store.set_last_searched(movie)?;
            show_details(ctx, movie.id, false, false).await?;
        }
    }

    Ok(())
}

pub async fn show_movie(ctx: &AppContext, id: MovieId, trailer: bool) -> Result<()> {
    show_details(ctx, id, true, trailer).await
}

async fn show_details(
    ctx: &AppContext,
    id: MovieId,
    record_view: bool,
    open_trailer: bool,
) -> Result<()> {
    let details = ctx
        .api()?
        .details(id)
        .await
        .map_err(|e| not_found_hint(id, e))?;

    if record_view {
        // View counters are best-effort: log and keep rendering.
        if let Err(e) = ctx.store.record_view(id) {
            warn!(movie_id = id, error = %e, "failed to record view");
        }
    }

    print_details(ctx, &details);

    if open_trailer {
        match details.trailer_url() {
            Some(url) => {
                if let Err(e) = open::that(&url) {
                    eprintln!("Failed to open browser: {}", e);
                }
            }
            None => println!("No trailer available"),
        }
    }

    Ok(())
}

pub fn toggle_favorite(ctx: &AppContext, id: MovieId) -> Result<()> {
    if ctx.store.toggle_favorite(id)? {
        println!("Added to favorites: {}", id);
    } else {
        println!("Removed from favorites: {}", id);
    }
    Ok(())
}

pub async fn list_favorites(ctx: &AppContext) -> Result<()> {
    let ids = ctx.store.favorites();

    if ids.is_empty() {
        println!("No favorites added yet.");
        return Ok(());
    }

    let mut errors = 0;
    for id in ids {
        match ctx.api()?.details(id).await {
            Ok(details) => print_movie_row(ctx, &details.as_movie()),
            Err(e) => {
                errors += 1;
                eprintln!("  Error fetching {}: {}", id, e);
            }
        }
    }
    if errors > 0 {
        eprintln!("{} favorites could not be fetched", errors);
    }

    Ok(())
}

pub fn show_history(ctx: &AppContext, clear: bool) -> Result<()> {
    if clear {
        ctx.store.clear_search_history()?;
        println!("Search history cleared");
        return Ok(());
    }

    let history = ctx.store.search_history();
    if history.is_empty() {
        println!("No search history found.");
        return Ok(());
    }

    for movie in &history {
        print_movie_row(ctx, movie);
    }

    Ok(())
}

pub fn login(ctx: &AppContext, username: &str, password: &str) -> Result<()> {
    if !verify_credentials(username, password) {
        return Err(MarqueeError::InvalidLogin);
    }

    ctx.store.login(username)?;
    println!("Logged in as {}", username);
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    ctx.store.logout()?;
    println!("Logged out");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let session = ctx.store.session();
    if session.logged_in {
        println!("Logged in as {}", session.username);
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn theme(ctx: &AppContext, mode: Option<&str>) -> Result<()> {
    match mode {
        None => println!("{}", ctx.store.theme()),
        Some(s) => {
            let mode = ThemeMode::parse(s)
                .ok_or_else(|| MarqueeError::Other(format!("unknown theme: {} (expected \"light\" or \"dark\")", s)))?;
            ctx.store.set_theme(mode)?;
            println!("Theme set to {}", mode);
        }
    }
    Ok(())
}

fn print_movie_list(ctx: &AppContext, movies: &[Movie], empty_message: &str) {
    if movies.is_empty() {
        println!("{}", empty_message);
        return;
    }
    for movie in movies {
        print_movie_row(ctx, movie);
    }
}

fn print_movie_row(ctx: &AppContext, movie: &Movie) {
    let fav = if ctx.store.is_favorite(movie.id) {
        "♥"
    } else {
        " "
    };
    let views = ctx.store.view_count(movie.id);

    println!(
        "{} {:>4}  {:>4}★  {:>3}v  {}  (id {})",
        fav,
        movie.year_label(),
        movie.rating_label(),
        views,
        movie.display_title(),
        movie.id
    );
}

fn print_details(ctx: &AppContext, details: &MovieDetails) {
    let movie = details.as_movie();

    println!("{} ({})", movie.display_title(), movie.year_label());
    println!(
        "{}  |  {}",
        details.runtime_label(),
        details.genre_names().join(", ")
    );
    println!(
        "Rating: {}/10 ({} votes)  Views: {}  Favorite: {}",
        movie.rating_label(),
        movie.vote_count,
        ctx.store.view_count(movie.id),
        if ctx.store.is_favorite(movie.id) {
            "yes"
        } else {
            "no"
        }
    );
    println!();
    println!("{}", movie.overview);

    if let Some(url) = movie.poster_url(&ctx.config.api.image_base_url) {
        println!();
        println!("Poster:  {}", url);
    }
    if let Some(url) = details.trailer_url() {
        println!("Trailer: {}", url);
    }
}

fn not_found_hint(id: MovieId, err: MarqueeError) -> MarqueeError {
    if let MarqueeError::Http(e) = &err {
        if e.status() == Some(StatusCode::NOT_FOUND) {
            return MarqueeError::MovieNotFound(id);
        }
    }
    err
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_credentials() {
        assert!(verify_credentials("admin", "admin"));
        assert!(!verify_credentials("admin", "hunter2"));
        assert!(!verify_credentials("root", "admin"));
        assert!(!verify_credentials("", ""));
    }

    #[test]
    fn test_login_rejects_bad_credentials_without_touching_store() {
        let ctx = AppContext::in_memory(crate::config::Config::default()).unwrap();
        let result = login(&ctx, "admin", "wrong");
        assert!(matches!(result, Err(MarqueeError::InvalidLogin)));
        assert!(!ctx.store.session().logged_in);
    }

    #[test]
    fn test_login_records_session() {
        let ctx = AppContext::in_memory(crate::config::Config::default()).unwrap();
        login(&ctx, "admin", "admin").unwrap();
        let session = ctx.store.session();
        assert!(session.logged_in);
        assert_eq!(session.username, "admin");

        logout(&ctx).unwrap();
        assert!(!ctx.store.session().logged_in);
    }
}
