pub mod app;
pub mod event;
pub mod layout;

use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::warn;

use crate::app::{AppContext, Result};
use crate::config::ColorConfig;
use crate::domain::ThemeMode;
use crate::store::{StateStore, StoreKey};

use self::app::{ActivePane, Section, TuiApp};
use self::event::{Action, AppEvent, EventHandler};

type Tui = Terminal<CrosstermBackend<Stdout>>;

pub async fn run(ctx: Arc<AppContext>) -> Result<()> {
    // Fail before touching the terminal when no API key is configured.
    ctx.api()?;

    let mut terminal = setup_terminal()?;
    let result = run_app(&mut terminal, ctx).await;
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn palette_for(theme: ThemeMode, ctx: &AppContext) -> &ColorConfig {
    match theme {
        ThemeMode::Dark => &ctx.config.colors.dark,
        ThemeMode::Light => &ctx.config.colors.light,
    }
}

fn draw(terminal: &mut Tui, tui_app: &TuiApp, ctx: &AppContext) -> Result<()> {
    let palette = palette_for(tui_app.theme, ctx);
    terminal.draw(|frame| layout::render(frame, tui_app, palette))?;
    Ok(())
}

async fn run_app(terminal: &mut Tui, ctx: Arc<AppContext>) -> Result<()> {
    let mut tui_app = TuiApp::new(ctx.store.theme(), ctx.store.session());
    let event_handler = EventHandler::new(Duration::from_millis(100));

    // Load initial data
    if let Err(e) = load_section(&mut tui_app, &ctx).await {
        tui_app.set_status(format!("Load failed: {}", e));
    }

    loop {
        draw(terminal, &tui_app, &ctx)?;

        match event_handler.next()? {
            AppEvent::Key(key) => {
                let action = Action::from(key);
                match action {
                    Action::Quit => {
                        tui_app.should_quit = true;
                    }
                    Action::MoveUp => {
                        tui_app.move_up();
                    }
                    Action::MoveDown => {
                        tui_app.move_down();
                    }
                    Action::NextPane => {
                        tui_app.active_pane = tui_app.active_pane.next();
                    }
                    Action::PrevPane => {
                        tui_app.active_pane = tui_app.active_pane.prev();
                    }
                    Action::Select => match tui_app.active_pane {
                        ActivePane::Sections => {
                            tui_app.is_loading = true;
                            draw(terminal, &tui_app, &ctx)?;
                            match load_section(&mut tui_app, &ctx).await {
                                Ok(()) => {
                                    tui_app.clear_status();
                                    tui_app.active_pane = ActivePane::Movies;
                                }
                                Err(e) => tui_app.set_status(format!("Load failed: {}", e)),
                            }
                            tui_app.is_loading = false;
                        }
                        ActivePane::Movies => {
                            if let Some(id) = tui_app.selected_movie().map(|m| m.id) {
                                tui_app.is_loading = true;
                                draw(terminal, &tui_app, &ctx)?;
                                open_detail(&mut tui_app, &ctx, id).await;
                                tui_app.is_loading = false;
                            }
                        }
                        ActivePane::Detail => {}
                    },
                    Action::Back => {
                        if tui_app.active_pane == ActivePane::Detail {
                            tui_app.active_pane = ActivePane::Movies;
                        }
                    }
                    Action::ToggleFavorite => {
                        let id = match tui_app.active_pane {
                            ActivePane::Detail => tui_app.detail.as_ref().map(|d| d.id),
                            _ => tui_app.selected_movie().map(|m| m.id),
                        };
                        if let Some(id) = id {
                            // Favorite writes are not fire-and-forget: a
                            // failed write must reach the user.
                            match ctx.store.toggle_favorite(id) {
                                Ok(true) => tui_app.set_status(format!("Added to favorites: {}", id)),
                                Ok(false) => {
                                    tui_app.set_status(format!("Removed from favorites: {}", id))
                                }
                                Err(e) => tui_app.set_status(format!("Favorite not saved: {}", e)),
                            }
                            tui_app.favorites = ctx.store.favorites();
                        }
                    }
                    Action::OpenTrailer => {
                        match tui_app.detail.as_ref().and_then(|d| d.trailer_url()) {
                            Some(url) => {
                                if let Err(e) = open::that(&url) {
                                    tui_app.set_status(format!("Failed to open browser: {}", e));
                                } else {
                                    tui_app.set_status(format!("Opened {}", url));
                                }
                            }
                            None => tui_app.set_status(
                                "No trailer loaded (Enter on a movie first)".to_string(),
                            ),
                        }
                    }
                    Action::ToggleTheme => {
                        let next = tui_app.theme.toggled();
                        match ctx.store.set_theme(next) {
                            Ok(()) => {
                                tui_app.theme = next;
                                tui_app.set_status(format!("Theme: {}", next));
                            }
                            Err(e) => tui_app.set_status(format!("Theme not saved: {}", e)),
                        }
                    }
                    Action::Refresh => {
                        tui_app.is_loading = true;
                        draw(terminal, &tui_app, &ctx)?;
                        match load_section(&mut tui_app, &ctx).await {
                            Ok(()) => tui_app.set_status("Refreshed".to_string()),
                            Err(e) => tui_app.set_status(format!("Refresh failed: {}", e)),
                        }
                        tui_app.is_loading = false;
                    }
                    Action::None => {}
                }
            }
            AppEvent::Tick => match ctx.store.poll_changes() {
                Ok(changed) => {
                    if !changed.is_empty() {
                        apply_external_changes(&mut tui_app, &ctx, &changed);
                    }
                }
                Err(e) => warn!(error = %e, "store poll failed"),
            },
        }

        if tui_app.should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_section(tui_app: &mut TuiApp, ctx: &AppContext) -> Result<()> {
    let movies = match tui_app.selected_section() {
        Section::Trending => ctx.api()?.trending().await?,
        Section::Popular => ctx.api()?.popular().await?,
        Section::Favorites => {
            let mut movies = Vec::new();
            for id in ctx.store.favorites() {
                match ctx.api()?.details(id).await {
                    Ok(details) => movies.push(details.as_movie()),
                    Err(e) => warn!(movie_id = id, error = %e, "failed to fetch favorite"),
                }
            }
            movies
        }
        Section::History => ctx.store.search_history(),
    };

    tui_app.movies = movies;
    if tui_app.movie_index >= tui_app.movies.len() {
        tui_app.movie_index = 0;
    }
    refresh_store_views(tui_app, ctx);
    Ok(())
}

/// Re-read the store-derived decorations (favorites, view counts) for the
/// movies currently on screen.
fn refresh_store_views(tui_app: &mut TuiApp, ctx: &AppContext) {
    tui_app.favorites = ctx.store.favorites();
    tui_app.view_counts = tui_app
        .movies
        .iter()
        .map(|m| (m.id, ctx.store.view_count(m.id)))
        .collect();
    if let Some(details) = &tui_app.detail {
        let id = details.id;
        let count = ctx.store.view_count(id);
        tui_app.view_counts.insert(id, count);
    }
}

async fn open_detail(tui_app: &mut TuiApp, ctx: &AppContext, id: i64) {
    let result = match ctx.api() {
        Ok(api) => api.details(id).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(details) => {
            // A lost view count is acceptable; log it and keep rendering.
            match ctx.store.record_view(id) {
                Ok(count) => {
                    tui_app.view_counts.insert(id, count);
                }
                Err(e) => warn!(movie_id = id, error = %e, "failed to record view"),
            }
            tui_app.detail = Some(details);
            tui_app.detail_scroll = 0;
            tui_app.active_pane = ActivePane::Detail;
            tui_app.clear_status();
        }
        Err(e) => tui_app.set_status(format!("Load failed: {}", e)),
    }
}

/// Re-read the entities behind keys another process changed, so this view
/// converges without a restart.
fn apply_external_changes(tui_app: &mut TuiApp, ctx: &AppContext, changed: &[StoreKey]) {
    for key in changed {
        match key {
            StoreKey::Favorites => {
                tui_app.favorites = ctx.store.favorites();
            }
            StoreKey::Views => {
                tui_app.view_counts = tui_app
                    .movies
                    .iter()
                    .map(|m| (m.id, ctx.store.view_count(m.id)))
                    .collect();
            }
            StoreKey::SearchHistory => {
                if tui_app.selected_section() == Section::History {
                    tui_app.movies = ctx.store.search_history();
                    if tui_app.movie_index >= tui_app.movies.len() {
                        tui_app.movie_index = 0;
                    }
                }
            }
            StoreKey::LastSearchedMovie => {}
            StoreKey::Theme => {
                tui_app.theme = ctx.store.theme();
            }
            StoreKey::LoggedIn | StoreKey::Username => {
                tui_app.session = ctx.store.session();
            }
        }
    }

    let keys: Vec<&str> = changed.iter().map(|k| k.as_str()).collect();
    tui_app.set_status(format!("Updated from another process: {}", keys.join(", ")));
}
