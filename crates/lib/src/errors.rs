use thiserror::Error;

/// Failure kinds for the ingest pipeline.
///
/// Every variant is a per-feed or per-entry error: the orchestrator logs it
/// with feed + entry context and moves on to the next entry. Nothing here is
/// fatal to a run; only configuration loading and schema initialization abort
/// the process (see [`crate::config::ConfigError`] and the binary).
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to parse feed: {0}")]
    FeedParse(#[from] rss::Error),

    #[error("failed to fetch content: {0}")]
    Fetch(String),

    #[error("entry has no parseable publication date: {0}")]
    Timestamp(String),

    #[error("HTML to Markdown conversion failed: {0}")]
    Convert(String),

    #[error("failed to write cache file: {0}")]
    CacheWrite(#[from] std::io::Error),

    #[error("knowledge base submission failed: {0}")]
    Submission(String),

    /// The dedup store already holds a record for this identity. By the time
    /// this can surface the remote submission has already happened, so the
    /// entry is reported as inconsistent rather than rolled back.
    #[error("ingest record already exists for {rss_id}/{guid}")]
    DedupConflict { rss_id: String, guid: String },

    #[error("database operation failed: {0}")]
    Database(#[from] turso::Error),
}
