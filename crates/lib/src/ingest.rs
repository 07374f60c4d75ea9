//! # Ingest Orchestration
//!
//! Drives one full pass over every configured feed: per entry, dedup lookup →
//! identity hash → content resolution → optional normalization → cache write →
//! remote submission → dedup record, strictly in that order. The record is
//! written only after the submission is confirmed, so a failed entry is
//! simply retried from scratch on the next run.

use std::time::Duration;

use tracing::{info, warn};

use crate::cache::write_cache_file;
use crate::config::{AppConfig, FeedConfig};
use crate::dedup::{compute_hash, DedupStore};
use crate::errors::IngestError;
use crate::feed::{fetch_feed, FeedEntry, ParsedFeed};
use crate::knowledge::KnowledgeClient;
use crate::markdown::html_to_markdown;
use crate::resolve::{
    cache_file_name, fetch_linked, format_published, synthesize, ContentKind, ResolvedContent,
};

/// Terminal state of a single entry within a run.
#[derive(Debug, PartialEq, Eq)]
enum EntryOutcome {
    /// The dedup store already holds a record for this entry.
    AlreadyIngested,
    /// A synthesis-mode filter rejected the entry.
    Filtered,
    /// Cached, uploaded, linked, and recorded.
    Submitted,
}

/// Counters for one full pass.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub feeds_failed: usize,
    pub entries_submitted: usize,
    pub entries_skipped: usize,
    pub entries_failed: usize,
}

/// Runs one single-pass sync over every configured feed, in configuration
/// order. Feed and entry failures are logged and skipped; nothing aborts a
/// run once it has started.
pub async fn run_ingest(
    config: &AppConfig,
    store: &DedupStore,
    client: &KnowledgeClient,
) -> RunSummary {
    let http = reqwest::Client::new();
    let mut summary = RunSummary::default();

    for feed in &config.feeds {
        let parsed = match fetch_feed(&http, &feed.url).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("skipping feed '{}': {e}", feed.id);
                summary.feeds_failed += 1;
                continue;
            }
        };

        for entry in &parsed.entries {
            match process_entry(config, store, client, &http, feed, &parsed, entry).await {
                Ok(EntryOutcome::Submitted) => {
                    summary.entries_submitted += 1;
                    // Crude global rate limit; applies only after an actual
                    // submission, never after skips or failures.
                    tokio::time::sleep(Duration::from_secs(config.submit_delay_secs)).await;
                }
                Ok(_) => summary.entries_skipped += 1,
                Err(e) => {
                    warn!("feed '{}' entry '{}' failed: {e}", feed.id, entry.guid);
                    summary.entries_failed += 1;
                }
            }
        }
    }

    summary
}

async fn process_entry(
    config: &AppConfig,
    store: &DedupStore,
    client: &KnowledgeClient,
    http: &reqwest::Client,
    feed: &FeedConfig,
    parsed: &ParsedFeed,
    entry: &FeedEntry,
) -> Result<EntryOutcome, IngestError> {
    if store.lookup(&feed.id, &entry.guid).await?.is_some() {
        return Ok(EntryOutcome::AlreadyIngested);
    }

    let hash = compute_hash(&feed.id, &entry.guid);

    let resolved = match resolve_entry(http, feed, parsed, entry, &hash).await? {
        Some(resolved) => resolved,
        None => return Ok(EntryOutcome::Filtered),
    };
    let ResolvedContent {
        bytes, file_name, ..
    } = resolved;

    let path = write_cache_file(&config.content_dir, &file_name, &bytes)?;
    info!("cached {} for feed '{}'", path.display(), feed.id);

    client
        .submit(&feed.knowledge_base_id, &file_name, bytes)
        .await?;
    info!(
        "added '{}' to knowledge base {}",
        file_name, feed.knowledge_base_id
    );

    store.record(&feed.id, &entry.guid, &hash).await?;

    Ok(EntryOutcome::Submitted)
}

/// Resolves an entry per the feed's mode, normalizes HTML when requested, and
/// derives the cache file name. `None` means a synthesis-mode filter rejected
/// the entry.
async fn resolve_entry(
    http: &reqwest::Client,
    feed: &FeedConfig,
    parsed: &ParsedFeed,
    entry: &FeedEntry,
    hash: &str,
) -> Result<Option<ResolvedContent>, IngestError> {
    let (bytes, kind) = if feed.follow_link {
        let (bytes, kind) = fetch_linked(http, &entry.link).await?;
        if kind == ContentKind::Html && feed.convert_html_to_markdown {
            let markdown = html_to_markdown(&String::from_utf8_lossy(&bytes))?;
            (markdown.into_bytes(), ContentKind::Markdown)
        } else {
            (bytes, kind)
        }
    } else {
        match synthesize(feed, &parsed.description, entry) {
            Some(body) => (body.into_bytes(), ContentKind::Markdown),
            None => return Ok(None),
        }
    };

    let published = format_published(entry.published.as_deref())?;
    let file_name = cache_file_name(&feed.name, &published, hash, kind);

    Ok(Some(ResolvedContent {
        bytes,
        kind,
        file_name,
    }))
}
