use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarqueeError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unexpected API response: {0}")]
    Api(String),

    #[error("Movie not found: {0}")]
    MovieNotFound(i64),

    #[error("Invalid username or password")]
    InvalidLogin,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
