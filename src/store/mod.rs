pub mod sqlite;

use std::fmt;

use crate::app::Result;
use crate::domain::{Movie, MovieId, Session, ThemeMode};

pub use sqlite::SqliteStore;

/// Search history keeps at most this many entries, most recent first.
pub const SEARCH_HISTORY_LIMIT: usize = 10;

/// Logical keys of the persisted state store. The string forms are the
/// storage contract: renaming one orphans the data in existing stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Favorites,
    Views,
    SearchHistory,
    LastSearchedMovie,
    Theme,
    LoggedIn,
    Username,
}

impl StoreKey {
    pub const ALL: [StoreKey; 7] = [
        StoreKey::Favorites,
        StoreKey::Views,
        StoreKey::SearchHistory,
        StoreKey::LastSearchedMovie,
        StoreKey::Theme,
        StoreKey::LoggedIn,
        StoreKey::Username,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StoreKey::Favorites => "favorites",
            StoreKey::Views => "views",
            StoreKey::SearchHistory => "searchHistory",
            StoreKey::LastSearchedMovie => "lastSearchedMovie",
            StoreKey::Theme => "theme",
            StoreKey::LoggedIn => "loggedIn",
            StoreKey::Username => "username",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoked with the key that changed when another process wrote to the
/// shared store. Fired from [`StateStore::poll_changes`].
pub type ChangeCallback = Box<dyn Fn(StoreKey) + Send>;

/// Client-local application state shared by every view and every process
/// pointed at the same storage.
///
/// Read operations are total: a missing key, a malformed stored value, or a
/// storage failure all yield the documented default (and a logged warning),
/// never an error. Write operations are read-modify-write cycles that
/// re-establish the structural invariants (no duplicate favorites, bounded
/// deduplicated history) regardless of what the stored value looked like,
/// and surface storage failures to the caller.
pub trait StateStore: Send + Sync {
    // Favorites
    fn is_favorite(&self, id: MovieId) -> bool;
    fn favorites(&self) -> Vec<MovieId>;
    /// Toggle membership, returning the resulting state.
    fn toggle_favorite(&self, id: MovieId) -> Result<bool>;

    // View counters
    /// Increment the counter for `id`, returning the new count.
    fn record_view(&self, id: MovieId) -> Result<u64>;
    fn view_count(&self, id: MovieId) -> u64;

    // Search history
    /// Prepend `movie`, dropping any older entry with the same id and
    /// truncating to [`SEARCH_HISTORY_LIMIT`].
    fn push_search_history(&self, movie: &Movie) -> Result<()>;
    fn search_history(&self) -> Vec<Movie>;
    fn clear_search_history(&self) -> Result<()>;

    // Last searched movie
    fn set_last_searched(&self, movie: &Movie) -> Result<()>;
    fn last_searched(&self) -> Option<Movie>;

    // Theme
    fn theme(&self) -> ThemeMode;
    fn set_theme(&self, mode: ThemeMode) -> Result<()>;

    // Session. Credential validation is the caller's job; the store only
    // records the outcome.
    fn login(&self, username: &str) -> Result<()>;
    fn logout(&self) -> Result<()>;
    fn session(&self) -> Session;

    // Cross-process change notification
    fn subscribe(&self, callback: ChangeCallback);
    /// Check for writes committed by other processes since the last poll.
    /// Fires subscribed callbacks and returns the changed keys. Local writes
    /// are never reported.
    fn poll_changes(&self) -> Result<Vec<StoreKey>>;
}
