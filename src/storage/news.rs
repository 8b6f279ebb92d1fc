//! SQLite persistence for news items and their comment links
//!
//! Writes go through a single shared connection used strictly
//! non-overlappingly by the orchestrator. Errors never escape the write
//! path: they are logged and reported through `SaveOutcome` or a zero
//! count so a bad write cannot take down a crawl cycle.

use crate::item::NewsItem;
use crate::storage::schema::initialize_schema;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::path::PathBuf;

/// Result of a story upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The story was written for the first time
    Inserted,

    /// A row with this id already existed; the stored row is untouched
    AlreadyExists,

    /// The write failed; the caller may retry later
    Failed,
}

/// SQLite storage gateway
pub struct NewsStorage {
    db_path: PathBuf,
    conn: Option<Connection>,
}

impl NewsStorage {
    /// Creates a gateway for the database at `path`; no connection is
    /// opened until `connect`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: path.into(),
            conn: None,
        }
    }

    /// Opens the shared connection and ensures tables exist. Idempotent.
    pub fn connect(&mut self) -> Result<(), rusqlite::Error> {
        if self.conn.is_none() {
            let conn = Connection::open(&self.db_path)?;
            conn.execute_batch(
                "
                PRAGMA journal_mode = WAL;
                PRAGMA synchronous = NORMAL;
                PRAGMA foreign_keys = ON;
            ",
            )?;
            initialize_schema(&conn)?;
            self.conn = Some(conn);
            tracing::info!("Database connection established: {}", self.db_path.display());
        }
        Ok(())
    }

    /// Releases the shared connection. Safe to call when never connected.
    pub fn close(&mut self) {
        if self.conn.take().is_some() {
            tracing::info!("Database connection closed");
        }
    }

    /// Inserts the story unless a row with the same id exists
    ///
    /// First write wins: a later item with the same id never overwrites
    /// stored content.
    pub fn save_item(&mut self, item: &NewsItem) -> SaveOutcome {
        let conn = match &self.conn {
            Some(c) => c,
            None => {
                tracing::error!("save_item called before connect");
                return SaveOutcome::Failed;
            }
        };

        let result = conn.execute(
            "INSERT OR IGNORE INTO news
             (id, title, url, score, comments_url, author, domain, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.id,
                item.title,
                item.url,
                item.score,
                item.comments_url,
                item.author,
                item.domain(),
                Utc::now().to_rfc3339(),
            ],
        );

        match result {
            Ok(0) => SaveOutcome::AlreadyExists,
            Ok(_) => SaveOutcome::Inserted,
            Err(e) => {
                tracing::error!("Error saving story {}: {}", item.id, e);
                SaveOutcome::Failed
            }
        }
    }

    /// Atomically replaces the stored link set for a story
    ///
    /// Empty input is a no-op that deletes nothing and returns 0. Returns
    /// the number of links written; errors are logged and reported as 0.
    pub fn save_links(&mut self, news_id: &str, links: &[String]) -> usize {
        if links.is_empty() {
            return 0;
        }

        let conn = match self.conn.as_mut() {
            Some(c) => c,
            None => {
                tracing::error!("save_links called before connect");
                return 0;
            }
        };

        let result = replace_links(conn, news_id, links);
        match result {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Error saving links for story {}: {}", news_id, e);
                0
            }
        }
    }

    /// Streams up to `limit` most recently created items, newest first
    ///
    /// Opens its own connection so reads never contend with the shared
    /// write connection; rows pass through `visit` one at a time and are
    /// never collected. Returns the number of rows visited.
    pub fn recent_items<F>(&self, limit: u32, mut visit: F) -> Result<usize, rusqlite::Error>
    where
        F: FnMut(NewsItem),
    {
        let conn = Connection::open(&self.db_path)?;
        // A read-only invocation may arrive before any crawl has created
        // the tables; the schema is create-if-absent either way.
        initialize_schema(&conn)?;
        let mut stmt = conn.prepare(
            "SELECT id, title, url, score, comments_url, author
             FROM news ORDER BY created_at DESC, rowid DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(NewsItem {
                id: row.get(0)?,
                title: row.get(1)?,
                url: row.get(2)?,
                score: row.get(3)?,
                comments_url: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                author: row
                    .get::<_, Option<String>>(5)?
                    .unwrap_or_else(|| "anonymous".to_string()),
            })
        })?;

        let mut count = 0;
        for row in rows {
            visit(row?);
            count += 1;
        }
        Ok(count)
    }
}

/// Delete-then-insert inside one transaction
fn replace_links(
    conn: &mut Connection,
    news_id: &str,
    links: &[String],
) -> Result<usize, rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM comment_links WHERE news_id = ?1",
        params![news_id],
    )?;
    {
        let mut stmt = tx.prepare("INSERT INTO comment_links (news_id, url) VALUES (?1, ?2)")?;
        for link in links {
            stmt.execute(params![news_id, link])?;
        }
    }
    tx.commit()?;
    Ok(links.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_item(id: &str) -> NewsItem {
        NewsItem {
            id: id.to_string(),
            title: "Test Title".to_string(),
            url: "https://target.example/article".to_string(),
            score: 42,
            comments_url: format!("https://news.example/item?id={}", id),
            author: "user".to_string(),
        }
    }

    fn connected_storage() -> NewsStorage {
        let mut storage = NewsStorage::new(":memory:");
        storage.connect().unwrap();
        storage
    }

    fn link_count(storage: &NewsStorage, news_id: &str) -> i64 {
        storage
            .conn
            .as_ref()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM comment_links WHERE news_id = ?1",
                [news_id],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_connect_is_idempotent() {
        let mut storage = connected_storage();
        assert!(storage.connect().is_ok());
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut storage = NewsStorage::new(":memory:");

        // Closing before ever connecting is a no-op
        storage.close();

        storage.connect().unwrap();
        storage.close();
        storage.close();
    }

    #[test]
    fn test_save_item_inserts_then_reports_duplicate() {
        let mut storage = connected_storage();
        let item = create_test_item("123");

        assert_eq!(storage.save_item(&item), SaveOutcome::Inserted);
        assert_eq!(storage.save_item(&item), SaveOutcome::AlreadyExists);
    }

    #[test]
    fn test_duplicate_insert_does_not_overwrite() {
        let mut storage = connected_storage();
        let item = create_test_item("123");
        storage.save_item(&item);

        let mut changed = create_test_item("123");
        changed.title = "Changed Title".to_string();
        changed.score = 999;
        changed.author = "other".to_string();
        assert_eq!(storage.save_item(&changed), SaveOutcome::AlreadyExists);

        let (title, score, author): (String, u32, String) = storage
            .conn
            .as_ref()
            .unwrap()
            .query_row(
                "SELECT title, score, author FROM news WHERE id = '123'",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .unwrap();

        assert_eq!(title, "Test Title");
        assert_eq!(score, 42);
        assert_eq!(author, "user");
    }

    #[test]
    fn test_save_item_before_connect_fails() {
        let mut storage = NewsStorage::new(":memory:");
        let item = create_test_item("1");
        assert_eq!(storage.save_item(&item), SaveOutcome::Failed);
    }

    #[test]
    fn test_save_links_empty_is_noop() {
        let mut storage = connected_storage();
        storage.save_item(&create_test_item("1"));

        let links = vec!["https://a.example/x".to_string()];
        assert_eq!(storage.save_links("1", &links), 1);

        // An empty save must not delete what is already stored
        assert_eq!(storage.save_links("1", &[]), 0);
        assert_eq!(link_count(&storage, "1"), 1);
    }

    #[test]
    fn test_save_links_replaces_previous_set() {
        let mut storage = connected_storage();
        storage.save_item(&create_test_item("1"));

        let first = vec![
            "https://a.example/1".to_string(),
            "https://a.example/2".to_string(),
            "https://a.example/3".to_string(),
        ];
        assert_eq!(storage.save_links("1", &first), 3);

        let second = vec!["https://b.example/only".to_string()];
        assert_eq!(storage.save_links("1", &second), 1);

        assert_eq!(link_count(&storage, "1"), 1);
        let stored: String = storage
            .conn
            .as_ref()
            .unwrap()
            .query_row(
                "SELECT url FROM comment_links WHERE news_id = '1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored, "https://b.example/only");
    }

    #[test]
    fn test_save_links_before_connect_returns_zero() {
        let mut storage = NewsStorage::new(":memory:");
        let links = vec!["https://a.example/x".to_string()];
        assert_eq!(storage.save_links("1", &links), 0);
    }

    #[test]
    fn test_recent_items_newest_first_with_limit() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("news.db");
        let mut storage = NewsStorage::new(&db_path);
        storage.connect().unwrap();

        for id in ["1", "2", "3"] {
            storage.save_item(&create_test_item(id));
        }

        let mut seen = Vec::new();
        let count = storage
            .recent_items(2, |item| seen.push(item.id.clone()))
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(seen, vec!["3".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_recent_items_on_empty_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("empty.db");
        let mut storage = NewsStorage::new(&db_path);
        storage.connect().unwrap();

        let count = storage.recent_items(10, |_| panic!("no rows expected")).unwrap();
        assert_eq!(count, 0);
    }
}
