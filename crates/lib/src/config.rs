//! # Configuration
//!
//! Loads the YAML configuration document describing storage paths, the
//! knowledge-base service credentials, and the ordered list of feeds to sync.
//! The configuration is loaded once at startup and treated as immutable for
//! the duration of a run.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Startup-fatal configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The root configuration document.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Path to the SQLite dedup store.
    pub db_file: String,
    /// Directory the resolved payloads are cached under. Must exist and be
    /// writable; no subdirectories are created below it.
    pub content_dir: PathBuf,
    /// Pause after each successful submission, protecting the remote service
    /// from burst load.
    #[serde(default = "default_submit_delay_secs")]
    pub submit_delay_secs: u64,
    pub knowledge_base: KnowledgeBaseConfig,
    pub feeds: Vec<FeedConfig>,
}

fn default_submit_delay_secs() -> u64 {
    5
}

/// Credentials and endpoint for the knowledge-base service.
#[derive(Debug, Deserialize, Clone)]
pub struct KnowledgeBaseConfig {
    pub api_endpoint: String,
    pub api_token: String,
}

/// One configured feed.
///
/// `id` is the identity key for the dedup store: it must never change once
/// entries have been recorded under it, or their history becomes unreachable.
/// `name` is only a display and filename token and may be edited freely.
#[derive(Debug, Deserialize, Clone)]
pub struct FeedConfig {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Fetch the document behind each entry's link instead of synthesizing a
    /// Markdown note from the feed metadata.
    #[serde(default)]
    pub follow_link: bool,
    /// Replaces the entry's own author list in synthesized notes.
    #[serde(default)]
    pub author_override: Option<String>,
    /// Convert fetched HTML to Markdown before caching and upload.
    #[serde(default)]
    pub convert_html_to_markdown: bool,
    /// Opaque id of the remote knowledge base entries are linked into.
    pub knowledge_base_id: String,
}

/// Reads and validates the configuration file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.db_file.is_empty() {
        return Err(ConfigError::Invalid("db_file must not be empty".into()));
    }
    if config.knowledge_base.api_endpoint.is_empty() {
        return Err(ConfigError::Invalid(
            "knowledge_base.api_endpoint must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for feed in &config.feeds {
        if feed.id.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "feed '{}' has an empty id",
                feed.name
            )));
        }
        if feed
            .id
            .chars()
            .any(|c| c.is_ascii_uppercase() || c.is_whitespace())
        {
            return Err(ConfigError::Invalid(format!(
                "feed id '{}' must be a lowercase token",
                feed.id
            )));
        }
        if !seen.insert(feed.id.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "duplicate feed id '{}'",
                feed.id
            )));
        }
    }
    Ok(())
}
