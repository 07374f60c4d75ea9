//! # feedsync
//!
//! Polls configured RSS feeds, resolves content for entries that have not yet
//! been ingested, caches it locally, and uploads it to a knowledge-base
//! service, recording each entry in a durable store so it is submitted at
//! most once.
//!
//! Per-entry pipeline: dedup lookup → identity hash → content resolution
//! (fetch the linked document, or synthesize a Markdown note from feed
//! metadata) → optional HTML→Markdown normalization → local cache write →
//! two-step remote submission (file upload, then knowledge-base link) →
//! dedup record. The record is written only after the remote submission
//! succeeds.

pub mod cache;
pub mod config;
pub mod dedup;
pub mod errors;
pub mod feed;
pub mod ingest;
pub mod knowledge;
pub mod markdown;
pub mod resolve;

pub use config::{load_config, AppConfig, ConfigError, FeedConfig, KnowledgeBaseConfig};
pub use dedup::{compute_hash, DedupStore};
pub use errors::IngestError;
pub use ingest::{run_ingest, RunSummary};
pub use knowledge::KnowledgeClient;
pub use resolve::{ContentKind, ResolvedContent};
