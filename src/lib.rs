//! # Marquee
//!
//! A terminal movie explorer backed by the TMDB metadata API.
//!
//! ## Architecture
//!
//! ```text
//! API client → domain models → persisted state store → CLI / TUI
//! ```
//!
//! - [`api`]: TMDB client (trending, popular, search, details)
//! - [`store`]: the persisted local-state layer (favorites, view counters,
//!   search history, theme, session) shared by every process pointed at the
//!   same database file
//! - [`tui`]: terminal user interface built with ratatui
//!
//! ## Quick Start
//!
//! ```bash
//! # List trending movies
//! marquee trending
//!
//! # Search, then record a selection in the history
//! marquee search "blade runner" --select 1
//!
//! # Toggle a favorite
//! marquee favorite 27205
//!
//! # Launch the TUI
//! marquee tui
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`api`]: Movie metadata API client
//! - [`cli`]: Command-line interface definitions
//! - [`config`]: Configuration file handling
//! - [`domain`]: Core domain models (Movie, Session, ThemeMode)
//! - [`store`]: Persisted state store
//! - [`tui`]: Terminal user interface

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store, the
/// API client, and the configuration.
pub mod app;

/// Movie metadata API client.
///
/// - [`MovieApi`](api::MovieApi): Async trait for the metadata collaborator
/// - [`TmdbClient`](api::TmdbClient): reqwest-based implementation
pub mod api;

/// Command-line interface using clap.
///
/// One subcommand per view: `trending`, `popular`, `search`, `show`,
/// `favorite`, `favorites`, `history`, `login`, `logout`, `whoami`,
/// `theme`, `tui`.
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/marquee/config.toml`, supporting the API key and
/// endpoints plus the dark/light color palettes.
pub mod config;

/// Core domain models.
///
/// - [`Movie`](domain::Movie): the API's movie snapshot
/// - [`Session`](domain::Session): mock login state
/// - [`ThemeMode`](domain::ThemeMode): light/dark
pub mod domain;

/// Persisted state store.
///
/// - [`StateStore`](store::StateStore): trait defining the operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation with
///   cross-process change notification
pub mod store;

/// Terminal user interface.
///
/// Three-pane layout built with ratatui: sections, movie list, detail.
/// Keybindings: j/k navigate, Tab cycles panes, f toggles favorite,
/// o opens the trailer, t toggles the theme, R refreshes, q quits.
pub mod tui;
