//! The news item value type shared by the extractor, orchestrator, and
//! storage.

use url::Url;

/// One story discovered on the front page.
///
/// `id` is the natural key: two items with the same id are the same logical
/// story, and storage never overwrites an earlier row with a later one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsItem {
    /// Stable per-story identifier assigned by the source site
    pub id: String,

    /// Story title
    pub title: String,

    /// Target URL the story points at
    pub url: String,

    /// Score at the time the front page was parsed
    pub score: u32,

    /// URL of the story's discussion thread
    pub comments_url: String,

    /// Submitting user
    pub author: String,
}

impl NewsItem {
    /// Host of the target URL. Recomputed on demand, never stored on the
    /// value itself.
    pub fn domain(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for NewsItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let title_short = if self.title.chars().count() > 60 {
            let head: String = self.title.chars().take(57).collect();
            format!("{}...", head.trim_end())
        } else {
            self.title.clone()
        };
        writeln!(
            f,
            "NewsItem(id={}, score={}, author={}",
            self.id, self.score, self.author
        )?;
        writeln!(f, "\tTitle: {}", title_short)?;
        writeln!(f, "\tURL: {}", self.url)?;
        writeln!(f, "\tComments: {}", self.comments_url)?;
        write!(f, "\tDomain: {})", self.domain())
    }
}
