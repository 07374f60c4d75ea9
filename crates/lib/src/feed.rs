//! # Feed Download & Entry Extraction
//!
//! Fetches a feed document over HTTP, parses it with the `rss` crate, and
//! flattens the channel into owned values the rest of the pipeline can hold
//! without borrowing the parser's structures.

use rss::Channel;
use tracing::warn;

use crate::errors::IngestError;

/// A parsed feed: channel-level metadata plus the entries in feed order.
#[derive(Debug)]
pub struct ParsedFeed {
    pub description: String,
    pub entries: Vec<FeedEntry>,
}

/// One feed item. All fields are read-only input from here on.
#[derive(Debug, Clone)]
pub struct FeedEntry {
    /// Entry identity within its feed. Falls back to the entry link when the
    /// feed omits `<guid>`.
    pub guid: String,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Raw publication string as the feed supplied it.
    pub published: Option<String>,
    pub authors: Vec<String>,
}

/// Downloads and parses the feed at `url`.
pub async fn fetch_feed(http: &reqwest::Client, url: &str) -> Result<ParsedFeed, IngestError> {
    let bytes = http
        .get(url)
        .send()
        .await
        .map_err(|e| IngestError::Fetch(e.to_string()))?
        .error_for_status()
        .map_err(|e| IngestError::Fetch(e.to_string()))?
        .bytes()
        .await
        .map_err(|e| IngestError::Fetch(e.to_string()))?;
    let channel = Channel::read_from(&bytes[..])?;
    Ok(parse_channel(channel))
}

fn parse_channel(channel: Channel) -> ParsedFeed {
    let entries = channel
        .items()
        .iter()
        .filter_map(|item| {
            let guid = match item.guid().map(|g| g.value()).or_else(|| item.link()) {
                Some(guid) => guid.to_string(),
                None => {
                    warn!(
                        "dropping entry with neither guid nor link (title: {:?})",
                        item.title()
                    );
                    return None;
                }
            };
            Some(FeedEntry {
                guid,
                title: item.title().unwrap_or_default().to_string(),
                description: item.description().unwrap_or_default().to_string(),
                link: item.link().unwrap_or_default().to_string(),
                published: item.pub_date().map(str::to_string),
                authors: item.author().map(str::to_string).into_iter().collect(),
            })
        })
        .collect();

    ParsedFeed {
        description: channel.description().to_string(),
        entries,
    }
}
