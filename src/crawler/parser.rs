//! Front-page and comment-thread extraction
//!
//! Pure functions from raw HTML to structured values; no I/O and no state
//! beyond the site base URL passed in by the caller. A malformed row or
//! comment never aborts the surrounding page.

use crate::item::NewsItem;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Extracts all stories from the front page
///
/// Rows missing a resolvable id or title link are skipped with a warning;
/// the rest of the page still parses. Relative story URLs are resolved
/// against `base`.
pub fn parse_front_page(html: &str, base: &Url) -> Vec<NewsItem> {
    let document = Html::parse_document(html);

    let row_selector = match Selector::parse("tr.athing") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut items = Vec::new();
    for row in document.select(&row_selector) {
        if let Some(item) = parse_story_row(row, base) {
            items.push(item);
        }
    }

    tracing::info!("Parsed {} stories from front page", items.len());
    items
}

/// Parses a single story row together with its sibling metadata row
fn parse_story_row(row: ElementRef, base: &Url) -> Option<NewsItem> {
    let id = match row.value().attr("id") {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            tracing::warn!("Story row without an id attribute, skipping");
            return None;
        }
    };

    let title_selector = Selector::parse(".titleline a").ok()?;
    let title_elem = match row.select(&title_selector).next() {
        Some(e) => e,
        None => {
            tracing::warn!("Story row {} has no title link, skipping", id);
            return None;
        }
    };

    let title = title_elem.text().collect::<String>().trim().to_string();
    let href = match title_elem.value().attr("href") {
        Some(h) if !h.is_empty() => h,
        _ => {
            tracing::warn!("Story row {} has a title link without href, skipping", id);
            return None;
        }
    };

    let url = if href.starts_with("http:") || href.starts_with("https:") {
        href.to_string()
    } else {
        match base.join(href) {
            Ok(u) => u.to_string(),
            Err(e) => {
                tracing::warn!("Story row {} has unresolvable URL '{}': {}", id, href, e);
                return None;
            }
        }
    };

    // Score and author live in the next table row; both default when the
    // metadata is absent or unparseable.
    let meta_row = row.next_siblings().filter_map(ElementRef::wrap).next();
    let score = meta_row
        .as_ref()
        .and_then(|m| select_text(m, ".score"))
        .map(|text| parse_score(&text))
        .unwrap_or(0);
    let author = meta_row
        .as_ref()
        .and_then(|m| select_text(m, ".hnuser"))
        .unwrap_or_else(|| "anonymous".to_string());

    let comments_url = base.join(&format!("item?id={}", id)).ok()?.to_string();

    Some(NewsItem {
        id,
        title,
        url,
        score,
        comments_url,
        author,
    })
}

/// First matching element's trimmed text, if any
fn select_text(element: &ElementRef, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    element
        .select(&selector)
        .next()
        .map(|e| e.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Leading integer of a "N points" label, defaulting to 0
fn parse_score(text: &str) -> u32 {
    text.split_whitespace()
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

/// Extracts external links from a discussion thread
///
/// Returns every hyperlink inside comment-text blocks except links back
/// into the thread itself (`item?id`, `reply?`) or to the site's own base
/// URL. Document order, duplicates preserved.
pub fn parse_comment_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    let comment_selector = match Selector::parse(".commtext") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };
    let anchor_selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for comment in document.select(&comment_selector) {
        for anchor in comment.select(&anchor_selector) {
            if let Some(href) = anchor.value().attr("href") {
                if is_external(href, base) {
                    links.push(href.to_string());
                }
            }
        }
    }

    tracing::info!("Found {} external links in comments", links.len());
    links
}

fn is_external(href: &str, base: &Url) -> bool {
    if href.starts_with("item?id") || href.starts_with("reply?") {
        return false;
    }
    let base_str = base.as_str().trim_end_matches('/');
    !href.starts_with(base_str)
}
