//! Storage module for persisting crawled stories
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite schema management (create-if-absent, never destructive)
//! - Idempotent story upserts and transactional link replacement
//! - A streaming read path for recent items on its own connection

mod news;
mod schema;

pub use news::{NewsStorage, SaveOutcome};
pub use schema::initialize_schema;
