//! Configuration management.
//!
//! Configuration is read from `~/.config/marquee/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is
//! created. The API key may also come from the `TMDB_API_KEY` environment
//! variable, which takes effect when the file leaves `key` empty.

pub mod colors;

pub use colors::{ColorConfig, ThemeColors};

use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub colors: ThemeColors,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// TMDB API key. Empty means "use the TMDB_API_KEY environment variable".
    pub key: String,
    pub base_url: String,
    pub image_base_url: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            base_url: "https://api.themoviedb.org/3".to_string(),
            image_base_url: "https://image.tmdb.org/t/p".to_string(),
            timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn resolve_key(&self) -> Option<String> {
        if !self.key.is_empty() {
            return Some(self.key.clone());
        }
        std::env::var("TMDB_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/marquee/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("marquee").join("config.toml"))
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let default_config = Self::default_config_content();

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        file.write_all(default_config.as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.clone(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Marquee Configuration
#
# Colors can be specified as:
# - Named colors: Black, Red, Green, Yellow, Blue, Magenta, Cyan, Gray,
#   DarkGray, LightRed, LightGreen, LightYellow, LightBlue, LightMagenta,
#   LightCyan, White, Reset
# - Hex colors: "#RRGGBB" or "#RGB"
#
# The [colors.dark] and [colors.light] palettes are selected by the theme
# stored in the app (toggle with `marquee theme` or `t` in the TUI).

[api]
# TMDB API key. Leave empty to use the TMDB_API_KEY environment variable.
key = ""

# API and image endpoints. The defaults point at themoviedb.org.
base_url = "https://api.themoviedb.org/3"
image_base_url = "https://image.tmdb.org/t/p"

# Request timeout in seconds.
timeout_secs = 10

[colors.dark]
active_border = "Cyan"
inactive_border = "DarkGray"
selection_bg = "Cyan"
selection_fg = "Black"
favorite = "Red"
rating = "Yellow"
text = "White"
text_dim = "DarkGray"
status_fg = "White"
status_bg = "DarkGray"

[colors.light]
active_border = "Blue"
inactive_border = "Gray"
selection_bg = "Blue"
selection_fg = "White"
favorite = "Red"
rating = "Magenta"
text = "Black"
text_dim = "Gray"
status_fg = "Black"
status_bg = "Gray"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.api.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.colors.dark.active_border, Color::Cyan);
        assert_eq!(config.colors.light.text, Color::Black);
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[api]
key = "abc123"

[colors.dark]
active_border = "#FF0000"
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.api.key, "abc123");
        // Custom value
        assert_eq!(config.colors.dark.active_border, Color::Rgb(255, 0, 0));
        // Default values fill the rest
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.colors.dark.inactive_border, Color::DarkGray);
        assert_eq!(config.colors.light.active_border, Color::Blue);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");

        assert_eq!(config.api.key, "");
        assert_eq!(config.colors.dark.active_border, Color::Cyan);
    }

    #[test]
    fn test_resolve_key_prefers_file() {
        let api = ApiConfig {
            key: "from-file".into(),
            ..Default::default()
        };
        assert_eq!(api.resolve_key().as_deref(), Some("from-file"));
    }
}
