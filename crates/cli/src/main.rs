//! Thin entrypoint for the `feedsync` binary. All pipeline logic lives in the
//! `feedsync` library crate.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use feedsync::{load_config, run_ingest, DedupStore, KnowledgeClient};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Sync configured RSS feeds into a knowledge base.
///
/// Intended to be invoked periodically (e.g. from a scheduler): one pass over
/// every configured feed, then exit. Entries that fail are retried from
/// scratch on the next invocation.
#[derive(Parser)]
#[command(name = "feedsync", version)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(long, default_value = "config.yml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env().add_directive("feedsync=info".parse()?))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let store = DedupStore::open(&config.db_file).await?;
    store.ensure_schema().await?;

    let client = KnowledgeClient::new(&config.knowledge_base);
    let summary = run_ingest(&config, &store, &client).await;

    info!(
        "run complete: {} submitted, {} skipped, {} failed, {} feeds unreachable",
        summary.entries_submitted,
        summary.entries_skipped,
        summary.entries_failed,
        summary.feeds_failed
    );

    Ok(())
}
