use std::path::PathBuf;
use std::sync::Arc;

use crate::api::{MovieApi, TmdbClient};
use crate::app::error::{MarqueeError, Result};
use crate::config::Config;
use crate::store::SqliteStore;

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub config: Config,
    api: Option<Arc<dyn MovieApi>>,
}

impl AppContext {
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };
        let store = Arc::new(SqliteStore::new(&db_path)?);
        let api = Self::build_api(&config)?;

        Ok(Self { store, config, api })
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        let api = Self::build_api(&config)?;

        Ok(Self { store, config, api })
    }

    /// The metadata API client. Errors when no API key is configured, so
    /// store-only commands keep working without one.
    pub fn api(&self) -> Result<&dyn MovieApi> {
        self.api.as_deref().ok_or_else(|| {
            MarqueeError::Config(
                "no TMDB API key configured; set [api] key in config.toml \
                 or the TMDB_API_KEY environment variable"
                    .into(),
            )
        })
    }

    fn build_api(config: &Config) -> Result<Option<Arc<dyn MovieApi>>> {
        match config.api.resolve_key() {
            Some(key) => {
                let client =
                    TmdbClient::new(&key, &config.api.base_url, config.api.timeout())?;
                Ok(Some(Arc::new(client)))
            }
            None => Ok(None),
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| MarqueeError::Config("Could not find data directory".into()))?;
        let marquee_dir = data_dir.join("marquee");
        std::fs::create_dir_all(&marquee_dir)?;
        Ok(marquee_dir.join("marquee.db"))
    }
}
