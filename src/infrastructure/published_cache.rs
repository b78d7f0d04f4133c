// Published Cache - time-boxed snapshot of the public preserve collection
// Entries expire after a TTL or as soon as the store reports a newer revision.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::AppResult;
use crate::models::PublicPreserve;

pub type PublishedSnapshot = Arc<Vec<PublicPreserve>>;

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: PublishedSnapshot,
    revision: u64,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_fresh(&self, revision: u64, ttl: Duration) -> bool {
        self.revision == revision && self.inserted_at.elapsed() < ttl
    }
}

#[derive(Debug)]
pub struct PublishedCache {
    ttl: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl PublishedCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Return the cached snapshot for `revision`, or run `load` and cache its result.
    /// Load failures are returned and never cached.
    pub async fn get_or_load<F, Fut>(&self, revision: u64, load: F) -> AppResult<PublishedSnapshot>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<Vec<PublicPreserve>>>,
    {
        if let Some(entry) = self.entry.read().await.as_ref() {
            if entry.is_fresh(revision, self.ttl) {
                debug!("Published cache hit (revision {})", revision);
                return Ok(entry.snapshot.clone());
            }
        }

        let mut slot = self.entry.write().await;
        // Another request may have refreshed the entry while we waited for the lock
        if let Some(entry) = slot.as_ref() {
            if entry.is_fresh(revision, self.ttl) {
                return Ok(entry.snapshot.clone());
            }
        }

        debug!("Published cache miss (revision {}), reloading", revision);
        let snapshot: PublishedSnapshot = Arc::new(load().await?);
        *slot = Some(CacheEntry {
            snapshot: snapshot.clone(),
            revision,
            inserted_at: Instant::now(),
        });
        Ok(snapshot)
    }
}
