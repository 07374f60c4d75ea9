//! # Content Resolver
//!
//! Turns a feed entry into the byte payload, content classification, and
//! cache file name the rest of the pipeline works with. Two mutually
//! exclusive modes per feed: fetch the document behind the entry's link, or
//! synthesize a small Markdown note from the feed metadata alone.

use chrono::DateTime;
use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};

use crate::config::FeedConfig;
use crate::errors::IngestError;
use crate::feed::FeedEntry;

/// Content classifications accepted from a linked document, in match order.
const ACCEPTED_KINDS: [ContentKind; 4] = [
    ContentKind::Html,
    ContentKind::Plain,
    ContentKind::Markdown,
    ContentKind::Pdf,
];

// Some servers refuse the default client identifier.
const FETCH_USER_AGENT: &str = "Mozilla/5.0";

/// The closed set of content types the pipeline handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    Plain,
    Markdown,
    Pdf,
}

impl ContentKind {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentKind::Html => "text/html",
            ContentKind::Plain => "text/plain",
            ContentKind::Markdown => "text/markdown",
            ContentKind::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::Html => ".html",
            ContentKind::Plain => ".txt",
            ContentKind::Markdown => ".md",
            ContentKind::Pdf => ".pdf",
        }
    }

    /// Matches a `Content-Type` header value against the accepted kinds.
    /// Substring match, first hit in the fixed order wins.
    pub fn from_content_type(header: &str) -> Option<ContentKind> {
        ACCEPTED_KINDS
            .iter()
            .copied()
            .find(|kind| header.contains(kind.mime()))
    }
}

/// Transient output of the resolver, consumed by the cache writer and the
/// submission client, then discarded.
#[derive(Debug)]
pub struct ResolvedContent {
    pub bytes: Vec<u8>,
    pub kind: ContentKind,
    pub file_name: String,
}

fn accept_header() -> String {
    ACCEPTED_KINDS
        .iter()
        .map(|kind| kind.mime())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Retrieves the document behind an entry's link.
///
/// Gated on both a success status and an accepted `Content-Type`; anything
/// else fails the entry.
pub async fn fetch_linked(
    http: &reqwest::Client,
    url: &str,
) -> Result<(Vec<u8>, ContentKind), IngestError> {
    let response = http
        .get(url)
        .header(ACCEPT, accept_header())
        .header(USER_AGENT, FETCH_USER_AGENT)
        .send()
        .await
        .map_err(|e| IngestError::Fetch(e.to_string()))?;

    if !response.status().is_success() {
        return Err(IngestError::Fetch(format!(
            "GET {url} returned status {}",
            response.status()
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let kind = ContentKind::from_content_type(&content_type).ok_or_else(|| {
        IngestError::Fetch(format!("unreadable content type '{content_type}' from {url}"))
    })?;

    let bytes = response
        .bytes()
        .await
        .map_err(|e| IngestError::Fetch(e.to_string()))?;

    Ok((bytes.to_vec(), kind))
}

/// Builds the synthesized Markdown note for an entry, or `None` when a filter
/// rejects it: placeholder-only description, empty title, or the `[No Title]`
/// artifact some feed software emits.
pub fn synthesize(
    feed: &FeedConfig,
    channel_description: &str,
    entry: &FeedEntry,
) -> Option<String> {
    if entry.description == "<p></p>" || entry.title.is_empty() {
        return None;
    }
    if entry.title.contains("[No Title]") {
        return None;
    }

    let mut metadata = String::new();
    if !entry.link.is_empty() {
        metadata.push_str(&format!("* **Link**: {}\n", entry.link));
    }
    match feed.author_override.as_deref() {
        Some(author) if !author.is_empty() => {
            metadata.push_str(&format!("* **Author**: {author}\n"));
        }
        _ => {
            for author in &entry.authors {
                metadata.push_str(&format!("* **Author**: {author}\n"));
            }
        }
    }

    let published = entry.published.as_deref().unwrap_or_default();
    Some(format!(
        "# {} [{}]\n\n## {}\n\n{}\n{}",
        feed.name, channel_description, published, metadata, entry.description
    ))
}

/// Formats the entry's publication date for the cache file name.
///
/// RSS convention is RFC 2822; some feeds emit RFC 3339 instead. Anything
/// else fails the entry. No default date is ever substituted.
pub fn format_published(published: Option<&str>) -> Result<String, IngestError> {
    let raw = match published {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(IngestError::Timestamp("missing".to_string())),
    };
    let parsed = DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map_err(|_| IngestError::Timestamp(raw.to_string()))?;
    Ok(parsed.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Cache file name: `{feed name} {published} {hash prefix}{extension}`.
/// The hash prefix keeps names collision-free across entries that share a
/// feed and timestamp.
pub fn cache_file_name(
    feed_name: &str,
    published: &str,
    hash: &str,
    kind: ContentKind,
) -> String {
    format!("{feed_name} {published} {}{}", &hash[..6], kind.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_config(author_override: Option<&str>) -> FeedConfig {
        FeedConfig {
            id: "blog".to_string(),
            name: "blog".to_string(),
            url: "http://localhost/feed.xml".to_string(),
            follow_link: false,
            author_override: author_override.map(str::to_string),
            convert_html_to_markdown: false,
            knowledge_base_id: "kb-1".to_string(),
        }
    }

    fn entry() -> FeedEntry {
        FeedEntry {
            guid: "abc123".to_string(),
            title: "Hello".to_string(),
            description: "World".to_string(),
            link: String::new(),
            published: Some("2024-01-02T03:04:05Z".to_string()),
            authors: Vec::new(),
        }
    }

    #[test]
    fn content_type_matching_is_ordered_substring() {
        assert_eq!(
            ContentKind::from_content_type("text/html; charset=utf-8"),
            Some(ContentKind::Html)
        );
        assert_eq!(
            ContentKind::from_content_type("text/markdown"),
            Some(ContentKind::Markdown)
        );
        assert_eq!(
            ContentKind::from_content_type("application/pdf"),
            Some(ContentKind::Pdf)
        );
        assert_eq!(ContentKind::from_content_type("application/json"), None);
        // Html precedes Plain in the fixed order.
        assert_eq!(
            ContentKind::from_content_type("text/html, text/plain"),
            Some(ContentKind::Html)
        );
    }

    #[test]
    fn extensions_follow_kind() {
        assert_eq!(ContentKind::Html.extension(), ".html");
        assert_eq!(ContentKind::Plain.extension(), ".txt");
        assert_eq!(ContentKind::Markdown.extension(), ".md");
        assert_eq!(ContentKind::Pdf.extension(), ".pdf");
    }

    #[test]
    fn accept_header_lists_all_kinds() {
        assert_eq!(
            accept_header(),
            "text/html, text/plain, text/markdown, application/pdf"
        );
    }

    #[test]
    fn synthesized_note_layout() {
        let body = synthesize(&feed_config(None), "A blog about tests", &entry()).unwrap();
        assert_eq!(
            body,
            "# blog [A blog about tests]\n\n## 2024-01-02T03:04:05Z\n\n\nWorld"
        );
    }

    #[test]
    fn synthesized_note_with_link_and_authors() {
        let mut e = entry();
        e.link = "http://x/hello".to_string();
        e.authors = vec!["alice".to_string(), "bob".to_string()];
        let body = synthesize(&feed_config(None), "d", &e).unwrap();
        assert!(body.contains("* **Link**: http://x/hello\n"));
        assert!(body.contains("* **Author**: alice\n* **Author**: bob\n"));
    }

    #[test]
    fn author_override_replaces_entry_authors() {
        let mut e = entry();
        e.authors = vec!["alice".to_string()];
        let body = synthesize(&feed_config(Some("Newsroom")), "d", &e).unwrap();
        assert!(body.contains("* **Author**: Newsroom\n"));
        assert!(!body.contains("alice"));
    }

    #[test]
    fn placeholder_description_or_empty_title_is_filtered() {
        let mut e = entry();
        e.description = "<p></p>".to_string();
        assert!(synthesize(&feed_config(None), "d", &e).is_none());

        let mut e = entry();
        e.title = String::new();
        assert!(synthesize(&feed_config(None), "d", &e).is_none());
    }

    #[test]
    fn no_title_marker_is_filtered() {
        let mut e = entry();
        e.title = "Foo [No Title]".to_string();
        assert!(synthesize(&feed_config(None), "d", &e).is_none());
    }

    #[test]
    fn published_formats_rfc2822_and_rfc3339() {
        assert_eq!(
            format_published(Some("Tue, 02 Jan 2024 03:04:05 GMT")).unwrap(),
            "2024-01-02 03:04:05"
        );
        assert_eq!(
            format_published(Some("2024-01-02T03:04:05Z")).unwrap(),
            "2024-01-02 03:04:05"
        );
    }

    #[test]
    fn unusable_published_fails_the_entry() {
        assert!(matches!(
            format_published(None),
            Err(IngestError::Timestamp(_))
        ));
        assert!(matches!(
            format_published(Some("yesterday")),
            Err(IngestError::Timestamp(_))
        ));
    }

    #[test]
    fn cache_file_name_shape() {
        let hash = crate::dedup::compute_hash("blog", "abc123");
        let name = cache_file_name("blog", "2024-01-02 03:04:05", &hash, ContentKind::Markdown);
        assert_eq!(name, format!("blog 2024-01-02 03:04:05 {}.md", &hash[..6]));
    }
}
