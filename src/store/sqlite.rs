use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, OptionalExtension};
use rusqlite_migration::{Migrations, M};
use tracing::warn;

use crate::app::{MarqueeError, Result};
use crate::domain::{Movie, MovieId, Session, ThemeMode};
use crate::store::{ChangeCallback, StateStore, StoreKey, SEARCH_HISTORY_LIMIT};

/// Raw value snapshot used to attribute external changes to specific keys.
struct WatchState {
    data_version: i64,
    snapshot: HashMap<StoreKey, Option<String>>,
}

pub struct SqliteStore {
    conn: Mutex<Connection>,
    watch: Mutex<WatchState>,
    subscribers: Mutex<Vec<ChangeCallback>>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
            watch: Mutex::new(WatchState {
                data_version: 0,
                snapshot: HashMap::new(),
            }),
            subscribers: Mutex::new(Vec::new()),
        };
        store.run_migrations()?;

        // Seed the watch state so the first poll only reports writes that
        // happen after this store was opened.
        let conn = store.lock_conn()?;
        let mut watch = store.lock_watch();
        watch.data_version = data_version(&conn)?;
        for key in StoreKey::ALL {
            let value = raw_get(&conn, key)?;
            watch.snapshot.insert(key, value);
        }
        drop(watch);
        drop(conn);

        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock_conn()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|e| MarqueeError::Other(format!("migration failed: {}", e)))?;

        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            MarqueeError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn lock_watch(&self) -> MutexGuard<'_, WatchState> {
        self.watch.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Read the raw stored string for a key, treating every failure as
    /// absence. Backs all the total read operations.
    fn read_raw(&self, key: StoreKey) -> Option<String> {
        let conn = match self.lock_conn() {
            Ok(conn) => conn,
            Err(e) => {
                warn!(key = %key, error = %e, "store read failed, using default");
                return None;
            }
        };
        match raw_get(&conn, key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "store read failed, using default");
                None
            }
        }
    }

    /// Record a locally-written value so it is not reported as an external
    /// change by the next poll.
    fn note_write(&self, key: StoreKey, value: Option<String>) {
        self.lock_watch().snapshot.insert(key, value);
    }

    fn decode_favorites(raw: Option<&str>) -> Vec<MovieId> {
        let Some(raw) = raw else {
            return Vec::new();
        };
        let ids: Vec<MovieId> = match serde_json::from_str(raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!(key = %StoreKey::Favorites, error = %e, "malformed stored value, using default");
                return Vec::new();
            }
        };
        dedup_in_order(ids)
    }

    fn decode_views(raw: Option<&str>) -> HashMap<MovieId, u64> {
        let Some(raw) = raw else {
            return HashMap::new();
        };
        match serde_json::from_str(raw) {
            Ok(views) => views,
            Err(e) => {
                warn!(key = %StoreKey::Views, error = %e, "malformed stored value, using default");
                HashMap::new()
            }
        }
    }

    fn decode_history(raw: Option<&str>) -> Vec<Movie> {
        let Some(raw) = raw else {
            return Vec::new();
        };
        let movies: Vec<Movie> = match serde_json::from_str(raw) {
            Ok(movies) => movies,
            Err(e) => {
                warn!(key = %StoreKey::SearchHistory, error = %e, "malformed stored value, using default");
                return Vec::new();
            }
        };
        normalize_history(movies)
    }
}

impl StateStore for SqliteStore {
    fn is_favorite(&self, id: MovieId) -> bool {
        self.favorites().contains(&id)
    }

    fn favorites(&self) -> Vec<MovieId> {
        Self::decode_favorites(self.read_raw(StoreKey::Favorites).as_deref())
    }

    fn toggle_favorite(&self, id: MovieId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let mut ids = Self::decode_favorites(raw_get(&conn, StoreKey::Favorites)?.as_deref());

        let now_favorite = if ids.contains(&id) {
            ids.retain(|&existing| existing != id);
            false
        } else {
            ids.push(id);
            true
        };

        let encoded = serde_json::to_string(&ids)?;
        raw_set(&conn, StoreKey::Favorites, &encoded)?;
        drop(conn);
        self.note_write(StoreKey::Favorites, Some(encoded));
        Ok(now_favorite)
    }

    fn record_view(&self, id: MovieId) -> Result<u64> {
        let conn = self.lock_conn()?;
        let mut views = Self::decode_views(raw_get(&conn, StoreKey::Views)?.as_deref());

        let count = views.entry(id).or_insert(0);
        *count += 1;
        let count = *count;

        let encoded = serde_json::to_string(&views)?;
        raw_set(&conn, StoreKey::Views, &encoded)?;
        drop(conn);
        self.note_write(StoreKey::Views, Some(encoded));
        Ok(count)
    }

    fn view_count(&self, id: MovieId) -> u64 {
        Self::decode_views(self.read_raw(StoreKey::Views).as_deref())
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    fn push_search_history(&self, movie: &Movie) -> Result<()> {
        let conn = self.lock_conn()?;
        let mut history = Self::decode_history(raw_get(&conn, StoreKey::SearchHistory)?.as_deref());

        history.retain(|m| m.id != movie.id);
        history.insert(0, movie.clone());
        history.truncate(SEARCH_HISTORY_LIMIT);

        let encoded = serde_json::to_string(&history)?;
        raw_set(&conn, StoreKey::SearchHistory, &encoded)?;
        drop(conn);
        self.note_write(StoreKey::SearchHistory, Some(encoded));
        Ok(())
    }

    fn search_history(&self) -> Vec<Movie> {
        Self::decode_history(self.read_raw(StoreKey::SearchHistory).as_deref())
    }

    fn clear_search_history(&self) -> Result<()> {
        let conn = self.lock_conn()?;
        raw_delete(&conn, StoreKey::SearchHistory)?;
        drop(conn);
        self.note_write(StoreKey::SearchHistory, None);
        Ok(())
    }

    fn set_last_searched(&self, movie: &Movie) -> Result<()> {
        let encoded = serde_json::to_string(movie)?;
        let conn = self.lock_conn()?;
        raw_set(&conn, StoreKey::LastSearchedMovie, &encoded)?;
        drop(conn);
        self.note_write(StoreKey::LastSearchedMovie, Some(encoded));
        Ok(())
    }

    fn last_searched(&self) -> Option<Movie> {
        let raw = self.read_raw(StoreKey::LastSearchedMovie)?;
        match serde_json::from_str(&raw) {
            Ok(movie) => Some(movie),
            Err(e) => {
                warn!(key = %StoreKey::LastSearchedMovie, error = %e, "malformed stored value, using default");
                None
            }
        }
    }

    fn theme(&self) -> ThemeMode {
        let Some(raw) = self.read_raw(StoreKey::Theme) else {
            return ThemeMode::default();
        };
        ThemeMode::parse(&raw).unwrap_or_else(|| {
            warn!(key = %StoreKey::Theme, value = %raw, "malformed stored value, using default");
            ThemeMode::default()
        })
    }

    fn set_theme(&self, mode: ThemeMode) -> Result<()> {
        let conn = self.lock_conn()?;
        raw_set(&conn, StoreKey::Theme, mode.as_str())?;
        drop(conn);
        self.note_write(StoreKey::Theme, Some(mode.as_str().to_string()));
        Ok(())
    }

    fn login(&self, username: &str) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        raw_set(&tx, StoreKey::LoggedIn, "true")?;
        raw_set(&tx, StoreKey::Username, username)?;
        tx.commit()?;
        drop(conn);
        self.note_write(StoreKey::LoggedIn, Some("true".to_string()));
        self.note_write(StoreKey::Username, Some(username.to_string()));
        Ok(())
    }

    fn logout(&self) -> Result<()> {
        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        raw_delete(&tx, StoreKey::LoggedIn)?;
        raw_delete(&tx, StoreKey::Username)?;
        tx.commit()?;
        drop(conn);
        self.note_write(StoreKey::LoggedIn, None);
        self.note_write(StoreKey::Username, None);
        Ok(())
    }

    fn session(&self) -> Session {
        // Only the exact string "true" counts as logged in, matching the
        // original storage format.
        let logged_in = self
            .read_raw(StoreKey::LoggedIn)
            .map(|v| v == "true")
            .unwrap_or(false);
        if !logged_in {
            return Session::default();
        }
        Session::logged_in(self.read_raw(StoreKey::Username).unwrap_or_default())
    }

    fn subscribe(&self, callback: ChangeCallback) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(callback);
    }

    fn poll_changes(&self) -> Result<Vec<StoreKey>> {
        let conn = self.lock_conn()?;
        let version = data_version(&conn)?;

        let mut watch = self.lock_watch();
        if version == watch.data_version {
            return Ok(Vec::new());
        }
        watch.data_version = version;

        let mut changed = Vec::new();
        for key in StoreKey::ALL {
            let current = raw_get(&conn, key)?;
            if watch.snapshot.get(&key) != Some(&current) {
                changed.push(key);
                watch.snapshot.insert(key, current);
            }
        }
        drop(watch);
        drop(conn);

        if !changed.is_empty() {
            let subscribers = self
                .subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for key in &changed {
                for callback in subscribers.iter() {
                    callback(*key);
                }
            }
        }

        Ok(changed)
    }
}

/// Changes iff another connection committed to the database file.
fn data_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}

fn raw_get(conn: &Connection, key: StoreKey) -> Result<Option<String>> {
    let value = conn
        .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            params![key.as_str()],
            |row| row.get(0),
        )
        .optional()?;
    Ok(value)
}

fn raw_set(conn: &Connection, key: StoreKey, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = ?2",
        params![key.as_str(), value],
    )?;
    Ok(())
}

fn raw_delete(conn: &Connection, key: StoreKey) -> Result<()> {
    conn.execute("DELETE FROM kv WHERE key = ?1", params![key.as_str()])?;
    Ok(())
}

fn dedup_in_order(ids: Vec<MovieId>) -> Vec<MovieId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Re-establish the history invariants on decode so a stale or hand-edited
/// value can never surface duplicates or an over-long list.
fn normalize_history(movies: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let mut history: Vec<Movie> = movies
        .into_iter()
        .filter(|m| seen.insert(m.id))
        .collect();
    history.truncate(SEARCH_HISTORY_LIMIT);
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn movie(id: MovieId, title: &str) -> Movie {
        Movie {
            id,
            title: title.into(),
            original_title: title.into(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 0.0,
            vote_count: 0,
            genre_ids: Vec::new(),
        }
    }

    /// Write a raw string directly under a key, bypassing the typed API.
    fn inject_raw(store: &SqliteStore, key: StoreKey, value: &str) {
        let conn = store.conn.lock().unwrap();
        raw_set(&conn, key, value).unwrap();
    }

    #[test]
    fn test_defaults_on_empty_store() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(!store.is_favorite(42));
        assert!(store.favorites().is_empty());
        assert_eq!(store.view_count(42), 0);
        assert!(store.search_history().is_empty());
        assert!(store.last_searched().is_none());
        assert_eq!(store.theme(), ThemeMode::Dark);
        assert_eq!(store.session(), Session::default());
    }

    #[test]
    fn test_toggle_favorite() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.toggle_favorite(9).unwrap());
        assert!(store.is_favorite(9));
        assert!(!store.toggle_favorite(9).unwrap());
        assert!(!store.is_favorite(9));
    }

    #[test]
    fn test_toggle_favorite_is_idempotent_pair() {
        let store = SqliteStore::in_memory().unwrap();
        store.toggle_favorite(1).unwrap();
        let before = store.favorites();

        store.toggle_favorite(7).unwrap();
        store.toggle_favorite(7).unwrap();

        assert_eq!(store.favorites(), before);
    }

    #[test]
    fn test_favorites_preserve_insertion_order() {
        let store = SqliteStore::in_memory().unwrap();
        for id in [3, 1, 2] {
            store.toggle_favorite(id).unwrap();
        }
        assert_eq!(store.favorites(), vec![3, 1, 2]);
    }

    #[test]
    fn test_favorites_malformed_value_reads_as_empty() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::Favorites, "not json {{{");
        assert!(!store.is_favorite(1));
        assert!(store.favorites().is_empty());

        // And toggling on top of the garbage starts from the empty set.
        assert!(store.toggle_favorite(1).unwrap());
        assert_eq!(store.favorites(), vec![1]);
    }

    #[test]
    fn test_favorites_duplicates_removed_on_decode() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::Favorites, "[5, 5, 7, 5]");
        assert_eq!(store.favorites(), vec![5, 7]);

        // Toggling off removes every stored occurrence.
        assert!(!store.toggle_favorite(5).unwrap());
        assert_eq!(store.favorites(), vec![7]);
    }

    #[test]
    fn test_record_view_monotonic() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.record_view(603).unwrap(), 1);
        assert_eq!(store.record_view(603).unwrap(), 2);
        assert_eq!(store.view_count(603), 2);
        assert_eq!(store.view_count(604), 0);

        let before = store.view_count(603);
        store.record_view(603).unwrap();
        assert!(store.view_count(603) > before);
    }

    #[test]
    fn test_views_malformed_value_reads_as_zero() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::Views, "[1,2,3]");
        assert_eq!(store.view_count(1), 0);
        assert_eq!(store.record_view(1).unwrap(), 1);
    }

    #[test]
    fn test_views_survive_reopen() {
        let file = tempfile::NamedTempFile::new().unwrap();
        {
            let store = SqliteStore::new(file.path()).unwrap();
            store.record_view(603).unwrap();
            store.record_view(603).unwrap();
        }
        let store = SqliteStore::new(file.path()).unwrap();
        assert_eq!(store.view_count(603), 2);
    }

    #[test]
    fn test_search_history_moves_duplicate_to_front() {
        let store = SqliteStore::in_memory().unwrap();
        store.push_search_history(&movie(5, "five")).unwrap();
        store.push_search_history(&movie(7, "seven")).unwrap();
        store.push_search_history(&movie(5, "five")).unwrap();

        let history = store.search_history();
        let ids: Vec<MovieId> = history.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![5, 7]);
    }

    #[test]
    fn test_search_history_bounded() {
        let store = SqliteStore::in_memory().unwrap();
        for id in 0..25 {
            store.push_search_history(&movie(id, "m")).unwrap();
        }

        let history = store.search_history();
        assert_eq!(history.len(), SEARCH_HISTORY_LIMIT);
        // Most recent first, oldest evicted.
        assert_eq!(history[0].id, 24);
        assert_eq!(history.last().unwrap().id, 15);
    }

    #[test]
    fn test_search_history_clear() {
        let store = SqliteStore::in_memory().unwrap();
        store.push_search_history(&movie(5, "five")).unwrap();
        store.clear_search_history().unwrap();
        assert!(store.search_history().is_empty());
    }

    #[test]
    fn test_search_history_malformed_value_reads_as_empty() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::SearchHistory, "{\"oops\": true}");
        assert!(store.search_history().is_empty());
    }

    #[test]
    fn test_search_history_normalized_on_decode() {
        let store = SqliteStore::in_memory().unwrap();
        // A foreign writer left duplicates and too many entries.
        let raw: Vec<String> = (0..15)
            .map(|i| format!("{{\"id\": {}}}", if i < 2 { 5 } else { i }))
            .collect();
        inject_raw(
            &store,
            StoreKey::SearchHistory,
            &format!("[{}]", raw.join(",")),
        );

        let history = store.search_history();
        assert!(history.len() <= SEARCH_HISTORY_LIMIT);
        let mut ids: Vec<MovieId> = history.iter().map(|m| m.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), history.len());
    }

    #[test]
    fn test_last_searched_round_trip() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(store.last_searched().is_none());

        store.set_last_searched(&movie(603, "The Matrix")).unwrap();
        let last = store.last_searched().unwrap();
        assert_eq!(last.id, 603);
        assert_eq!(last.title, "The Matrix");

        store.set_last_searched(&movie(604, "Reloaded")).unwrap();
        assert_eq!(store.last_searched().unwrap().id, 604);
    }

    #[test]
    fn test_last_searched_malformed_value_reads_as_none() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::LastSearchedMovie, "nope");
        assert!(store.last_searched().is_none());
    }

    #[test]
    fn test_theme_round_trip_and_default() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.theme(), ThemeMode::Dark);

        store.set_theme(ThemeMode::Light).unwrap();
        assert_eq!(store.theme(), ThemeMode::Light);

        inject_raw(&store, StoreKey::Theme, "sepia");
        assert_eq!(store.theme(), ThemeMode::Dark);
    }

    #[test]
    fn test_login_logout_session() {
        let store = SqliteStore::in_memory().unwrap();
        store.login("admin").unwrap();
        assert_eq!(
            store.session(),
            Session {
                logged_in: true,
                username: "admin".into()
            }
        );

        store.logout().unwrap();
        assert_eq!(store.session(), Session::default());
        assert_eq!(store.session().username, "");
    }

    #[test]
    fn test_session_requires_exact_true() {
        let store = SqliteStore::in_memory().unwrap();
        inject_raw(&store, StoreKey::LoggedIn, "TRUE");
        inject_raw(&store, StoreKey::Username, "admin");
        assert!(!store.session().logged_in);
    }

    #[test]
    fn test_poll_ignores_own_writes() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store = SqliteStore::new(file.path()).unwrap();
        store.toggle_favorite(9).unwrap();
        store.set_theme(ThemeMode::Light).unwrap();
        assert!(store.poll_changes().unwrap().is_empty());
    }

    #[test]
    fn test_poll_reports_foreign_write() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store_a = SqliteStore::new(file.path()).unwrap();
        let store_b = SqliteStore::new(file.path()).unwrap();

        let seen: Arc<Mutex<Vec<StoreKey>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        store_b.subscribe(Box::new(move |key| {
            sink.lock().unwrap().push(key);
        }));

        // "Tab A" favorites a movie; "tab B" observes it without reopening.
        store_a.toggle_favorite(9).unwrap();

        let changed = store_b.poll_changes().unwrap();
        assert_eq!(changed, vec![StoreKey::Favorites]);
        assert!(store_b.is_favorite(9));
        assert_eq!(*seen.lock().unwrap(), vec![StoreKey::Favorites]);

        // Nothing further to report.
        assert!(store_b.poll_changes().unwrap().is_empty());
    }

    #[test]
    fn test_poll_reports_only_changed_keys() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store_a = SqliteStore::new(file.path()).unwrap();
        let store_b = SqliteStore::new(file.path()).unwrap();

        store_a.login("admin").unwrap();

        let changed = store_b.poll_changes().unwrap();
        assert!(changed.contains(&StoreKey::LoggedIn));
        assert!(changed.contains(&StoreKey::Username));
        assert!(!changed.contains(&StoreKey::Favorites));
        assert!(store_b.session().logged_in);
    }

    #[test]
    fn test_concurrent_stores_keep_invariants() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let store_a = SqliteStore::new(file.path()).unwrap();
        let store_b = SqliteStore::new(file.path()).unwrap();

        // Interleaved pushes from two stores: the bound and uniqueness must
        // hold even though neither saw the other's writes beforehand.
        for id in 0..8 {
            store_a.push_search_history(&movie(id, "a")).unwrap();
            store_b.push_search_history(&movie(id + 100, "b")).unwrap();
        }

        for store in [&store_a, &store_b] {
            let history = store.search_history();
            assert!(history.len() <= SEARCH_HISTORY_LIMIT);
            let mut ids: Vec<MovieId> = history.iter().map(|m| m.id).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), history.len());
        }
    }
}
