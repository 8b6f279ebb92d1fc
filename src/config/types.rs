use serde::Deserialize;

/// Main configuration structure for newswatch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawler: CrawlerConfig,
    pub output: OutputConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Base URL the front page and discussion pages hang off
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Identifying string sent as the User-Agent header
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Seconds between crawl cycles (minimum 5)
    pub interval: u64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout")]
    pub request_timeout: u64,

    /// Attempts per fetch before a transport failure is surfaced
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Maximum concurrent in-flight HTTP requests
    #[serde(rename = "max-concurrent-requests")]
    pub max_concurrent_requests: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://news.ycombinator.com".to_string(),
            user_agent: "newswatch/0.1 (front page archiver)".to_string(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            interval: 30,
            request_timeout: 10,
            max_retries: 3,
            max_concurrent_requests: 5,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./news.db".to_string(),
        }
    }
}
