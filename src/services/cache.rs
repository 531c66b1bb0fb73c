use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::core::text::normalize_statement;

/// In-memory cache of generated descriptions
///
/// Holds raw model output keyed by listing and buyer statement, so a
/// repeated search can reuse it instead of calling the provider again.
#[derive(Clone)]
pub struct DescriptionCache {
    inner: moka::future::Cache<String, String>,
}

impl DescriptionCache {
    /// Create a new cache holding up to `capacity` entries for `ttl_secs`
    pub fn new(capacity: u64, ttl_secs: u64) -> Self {
        let inner = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        let hit = self.inner.get(key).await;
        if hit.is_some() {
            tracing::trace!("Description cache hit: {}", key);
        }
        hit
    }

    pub async fn set(&self, key: String, description: String) {
        tracing::trace!("Description cache set: {}", key);
        self.inner.insert(key, description).await;
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.inner.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for a listing description written for a statement
    pub fn description(listing_id: u64, statement: &str) -> String {
        format!("description:{}:{}", listing_id, normalize_statement(statement))
    }
}
