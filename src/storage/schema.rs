//! Database schema definitions
//!
//! All SQL schema for the newswatch database lives here.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Stories discovered on the front page
CREATE TABLE IF NOT EXISTS news (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    url TEXT NOT NULL,
    score INTEGER NOT NULL DEFAULT 0,
    comments_url TEXT,
    author TEXT,
    domain TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_news_created ON news(created_at);

-- External links found in each story's discussion thread
CREATE TABLE IF NOT EXISTS comment_links (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    news_id TEXT NOT NULL REFERENCES news(id),
    url TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_comment_links_news ON comment_links(news_id);
"#;

/// Initializes the database schema
///
/// Idempotent: every statement is create-if-absent, existing data is never
/// touched.
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)
}
