//! Configuration loading and validation
//!
//! Configuration comes from an optional TOML file; every option has a
//! built-in default so the crawler runs without one.

mod parser;
mod types;
mod validation;

pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use types::{Config, CrawlerConfig, OutputConfig, SiteConfig};
pub use validation::{validate, MIN_CRAWL_INTERVAL};
