use super::entry::CacheEntry;
use super::key::CacheKey;
use dashmap::DashMap;
use hickory_proto::rr::Record;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AnswerCacheConfig {
    pub max_entries: usize,
    /// Stale-while-revalidate window appended after the answer TTL.
    pub grace: Duration,
    /// Lifetime of cached empty results.
    pub negative_retention: Duration,
}

impl Default for AnswerCacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            grace: Duration::from_secs(60),
            negative_retention: Duration::from_secs(30),
        }
    }
}

/// Bounded concurrent map from question to answer set.
///
/// Sharded locking keeps unrelated keys from blocking each other; the
/// single-flight state lives with the resolver layer, outside this index,
/// so an in-flight lookup can never be evicted.
pub struct AnswerCache {
    entries: DashMap<CacheKey, Arc<CacheEntry>, FxBuildHasher>,
    config: AnswerCacheConfig,
}

impl AnswerCache {
    pub fn new(config: AnswerCacheConfig) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            config,
        }
    }

    /// Returns the entry if it is still usable (possibly stale), dropping
    /// it from the index otherwise.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        let now = Instant::now();
        let entry = {
            let guard = self.entries.get(key)?;
            Arc::clone(guard.value())
        };

        if !entry.is_usable(now) {
            self.entries
                .remove_if(key, |_, current| !current.is_usable(now));
            return None;
        }

        entry.record_access();
        Some(entry)
    }

    /// Writes a completed lookup. `effective_ttl = None` marks an empty
    /// result, which is retained for the negative window and never served
    /// stale.
    pub fn insert(
        &self,
        key: CacheKey,
        answers: Arc<Vec<Record>>,
        authoritative: bool,
        effective_ttl: Option<Duration>,
    ) -> Arc<CacheEntry> {
        if self.entries.len() >= self.config.max_entries {
            self.evict();
        }

        let now = Instant::now();
        let (stale_at, invalid_at) = match effective_ttl {
            Some(ttl) => (now + ttl, now + ttl + self.config.grace),
            None => (
                now + self.config.negative_retention,
                now + self.config.negative_retention,
            ),
        };

        let entry = Arc::new(CacheEntry::new(answers, authoritative, stale_at, invalid_at));
        self.entries.insert(key, Arc::clone(&entry));
        entry
    }

    pub fn remove(&self, key: &CacheKey) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Least-recently-used eviction among entries already past `stale_at`;
    /// falls back to the coldest entry overall when nothing is stale yet.
    fn evict(&self) {
        let now = Instant::now();
        let mut candidates: Vec<(CacheKey, u64, bool)> = self
            .entries
            .iter()
            .map(|e| {
                (
                    e.key().clone(),
                    e.value().last_access.load(AtomicOrdering::Relaxed),
                    !e.value().is_fresh(now),
                )
            })
            .collect();

        let stale_only: Vec<_> = candidates.iter().filter(|(_, _, stale)| *stale).collect();
        let evict_count = (self.config.max_entries / 10).max(1);

        if !stale_only.is_empty() {
            let mut stale: Vec<(CacheKey, u64)> = stale_only
                .into_iter()
                .map(|(k, a, _)| (k.clone(), *a))
                .collect();
            stale.sort_by_key(|(_, access)| *access);
            for (key, _) in stale.into_iter().take(evict_count) {
                self.entries.remove(&key);
            }
        } else {
            candidates.sort_by_key(|(_, access, _)| *access);
            for (key, _, _) in candidates.into_iter().take(evict_count) {
                self.entries.remove(&key);
            }
        }

        debug!(size = self.entries.len(), "Cache eviction pass complete");
    }

    /// Drops every entry past its invalid deadline; used by the
    /// maintenance task.
    pub fn sweep_invalid(&self) -> usize {
        let now = Instant::now();
        let dead: Vec<CacheKey> = self
            .entries
            .iter()
            .filter(|e| !e.value().is_usable(now))
            .map(|e| e.key().clone())
            .collect();

        let mut removed = 0;
        for key in dead {
            if self
                .entries
                .remove_if(&key, |_, entry| !entry.is_usable(now))
                .is_some()
            {
                removed += 1;
            }
        }
        removed
    }
}
