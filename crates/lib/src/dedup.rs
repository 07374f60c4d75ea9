//! # Identity & Dedup Store
//!
//! Durable record of which (feed, entry) pairs have already been fully
//! ingested. Each record carries the entry's identity hash, which doubles as
//! the cache-filename disambiguator. Records are created exactly once, after
//! a confirmed remote submission, and are never updated or deleted.

use sha2::{Digest, Sha256};
use turso::{params, Builder, Database};

use crate::errors::IngestError;

/// Deterministic identity hash for a feed entry: lowercase hex SHA-256 of
/// `"{rss_id}-{guid}"`. Stable across runs — no salt, no time component.
pub fn compute_hash(rss_id: &str, guid: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rss_id.as_bytes());
    hasher.update(b"-");
    hasher.update(guid.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// SQLite-backed store of ingested entries.
pub struct DedupStore {
    db: Database,
}

impl DedupStore {
    /// Opens (or creates) the store at the given path. `":memory:"` gives an
    /// isolated in-memory store.
    pub async fn open(path: &str) -> Result<Self, IngestError> {
        let db = Builder::new_local(path).build().await?;
        Ok(Self { db })
    }

    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Creates the backing table when absent. Safe to call on every run; an
    /// existing table is left untouched.
    pub async fn ensure_schema(&self) -> Result<(), IngestError> {
        let conn = self.db.connect()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS rss_records (
                rss_id TEXT NOT NULL,
                guid TEXT NOT NULL,
                hash TEXT NOT NULL,
                PRIMARY KEY (rss_id, guid),
                UNIQUE(hash)
            )",
            (),
        )
        .await?;
        Ok(())
    }

    /// Returns the recorded hash for an entry, or `None` when the entry has
    /// not been ingested yet.
    pub async fn lookup(&self, rss_id: &str, guid: &str) -> Result<Option<String>, IngestError> {
        let conn = self.db.connect()?;
        let row = conn
            .query(
                "SELECT hash FROM rss_records WHERE rss_id = ? AND guid = ?",
                params![rss_id, guid],
            )
            .await?
            .next()
            .await?;
        match row {
            Some(row) => Ok(Some(row.get(0)?)),
            None => Ok(None),
        }
    }

    /// Inserts the record for a freshly submitted entry.
    ///
    /// A uniqueness violation maps to [`IngestError::DedupConflict`]: under
    /// the lookup-then-record protocol it can only mean a second writer is
    /// racing this one on the same store.
    pub async fn record(
        &self,
        rss_id: &str,
        guid: &str,
        hash: &str,
    ) -> Result<(), IngestError> {
        let conn = self.db.connect()?;
        let result = conn
            .execute(
                "INSERT INTO rss_records (rss_id, guid, hash) VALUES (?, ?, ?)",
                params![rss_id, guid, hash],
            )
            .await;
        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(IngestError::DedupConflict {
                rss_id: rss_id.to_string(),
                guid: guid.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

// turso surfaces constraint failures as generic execution errors; the message
// is the only discriminator available.
fn is_unique_violation(err: &turso::Error) -> bool {
    let message = err.to_string();
    message.contains("UNIQUE") || message.contains("PRIMARY KEY")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let a = compute_hash("blog", "abc123");
        let b = compute_hash("blog", "abc123");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_differs_per_identity() {
        assert_ne!(compute_hash("blog", "abc123"), compute_hash("blog", "abc124"));
        assert_ne!(compute_hash("blog", "abc123"), compute_hash("news", "abc123"));
    }

    async fn open_store() -> DedupStore {
        let store = DedupStore::open(":memory:").await.unwrap();
        store.ensure_schema().await.unwrap();
        store
    }

    #[tokio::test]
    async fn ensure_schema_is_idempotent() {
        let store = open_store().await;
        store.ensure_schema().await.unwrap();
        assert_eq!(store.lookup("blog", "abc123").await.unwrap(), None);
    }

    #[tokio::test]
    async fn record_then_lookup_roundtrip() {
        let store = open_store().await;
        let hash = compute_hash("blog", "abc123");
        store.record("blog", "abc123", &hash).await.unwrap();
        assert_eq!(store.lookup("blog", "abc123").await.unwrap(), Some(hash));
        assert_eq!(store.lookup("blog", "other").await.unwrap(), None);
    }

    #[tokio::test]
    async fn duplicate_record_is_a_conflict() {
        let store = open_store().await;
        let hash = compute_hash("blog", "abc123");
        store.record("blog", "abc123", &hash).await.unwrap();
        let err = store.record("blog", "abc123", &hash).await.unwrap_err();
        assert!(matches!(err, IngestError::DedupConflict { .. }));
    }
}
