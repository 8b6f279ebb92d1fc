//! Newswatch: a front-page crawler for a news aggregation site
//!
//! Newswatch polls the site's front page on a fixed interval, pulls the
//! external links out of each story's discussion thread, and archives
//! stories and links in SQLite without reprocessing stories it has already
//! seen during the current run.

pub mod config;
pub mod crawler;
pub mod item;
pub mod storage;

use thiserror::Error;

/// Main error type for newswatch operations
#[derive(Debug, Error)]
pub enum NewswatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Error raised when a fetch exhausts its transport retries or the server
/// answers with an HTTP error status.
///
/// `status` carries the response code for HTTP errors and is `None` when
/// every transport-level attempt (connect, timeout) failed.
#[derive(Debug, Clone, Error)]
#[error("fetch failed for {url}: {message}")]
pub struct FetchError {
    pub url: String,
    pub status: Option<u16>,
    pub message: String,
}

impl FetchError {
    /// True when the server answered 429 Too Many Requests.
    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
    }
}

/// Result type alias for newswatch operations
pub type Result<T> = std::result::Result<T, NewswatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use item::NewsItem;
