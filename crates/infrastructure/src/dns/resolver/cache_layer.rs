use super::super::cache::{AnswerCache, CacheEntry, CacheKey};
use async_trait::async_trait;
use dashmap::DashMap;
use keystone_dns_application::ports::{DnsResolver, PartialAnswers, Resolution};
use keystone_dns_domain::{DomainError, Question};
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, warn};

type InflightSender = Arc<watch::Sender<Option<Arc<Resolution>>>>;
type InflightMap = DashMap<CacheKey, InflightSender, FxBuildHasher>;

/// TTL stamped on answers served while a renewal is in flight.
const STALE_SERVE_TTL: u32 = 1;

/// Caching decorator around the resolution core.
///
/// Misses are single-flighted per key: one leader resolves, every
/// concurrent caller for the same key observes the leader's result. Stale
/// entries are served immediately while one background renewal refreshes
/// them.
pub struct CachedResolver {
    inner: Arc<dyn DnsResolver>,
    cache: Arc<AnswerCache>,
    inflight: Arc<InflightMap>,
}

/// Clears the leader's in-flight slot no matter how the leader exits.
///
/// The leader's future runs under the caller's question deadline and can
/// be dropped at any await point; without this, the stranded entry would
/// turn every later lookup for the key into a follower of a channel that
/// never fires.
struct InflightGuard<'a> {
    inflight: &'a InflightMap,
    key: Option<CacheKey>,
}

impl<'a> InflightGuard<'a> {
    fn new(inflight: &'a InflightMap, key: CacheKey) -> Self {
        Self {
            inflight,
            key: Some(key),
        }
    }

    /// Takes this key's sender out of the in-flight table so the leader
    /// can publish; the drop cleanup is disarmed once this runs.
    fn complete(&mut self) -> Option<InflightSender> {
        self.key
            .take()
            .and_then(|key| self.inflight.remove(&key))
            .map(|(_, tx)| tx)
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            // Dropping the sender closes the channel, so waiting
            // followers fall through instead of blocking forever.
            self.inflight.remove(&key);
        }
    }
}

impl CachedResolver {
    pub fn new(inner: Arc<dyn DnsResolver>, cache: Arc<AnswerCache>) -> Self {
        Self {
            inner,
            cache,
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
        }
    }

    fn serve_entry(entry: &CacheEntry, ttl: u32) -> Resolution {
        let records = entry
            .answers
            .iter()
            .cloned()
            .map(|mut record| {
                record.set_ttl(ttl);
                record
            })
            .collect();
        Resolution {
            records: Arc::new(records),
            authoritative: entry.authoritative,
            cache_hit: true,
            cacheable: true,
        }
    }

    fn check_cache(&self, question: &Question, key: &CacheKey) -> Option<Resolution> {
        let entry = self.cache.get(key)?;
        let now = Instant::now();

        if entry.is_fresh(now) {
            debug!(
                name = %question.name,
                record_type = %question.record_type,
                "Cache HIT"
            );
            return Some(Self::serve_entry(&entry, entry.remaining_ttl(now)));
        }

        // Stale but usable: serve now, renew behind the scenes.
        if entry.try_begin_refresh() {
            debug!(
                name = %question.name,
                record_type = %question.record_type,
                "Cache renewal"
            );
            self.spawn_renewal(question.clone(), key.clone(), Arc::clone(&entry));
        }
        Some(Self::serve_entry(&entry, STALE_SERVE_TTL))
    }

    fn spawn_renewal(&self, question: Question, key: CacheKey, old_entry: Arc<CacheEntry>) {
        let inner = Arc::clone(&self.inner);
        let cache = Arc::clone(&self.cache);
        tokio::spawn(async move {
            match inner.resolve(&question, &PartialAnswers::new()).await {
                Ok(resolution) if resolution.cacheable => {
                    store_resolution(&cache, key, &resolution);
                }
                Ok(_) => {
                    // Transient store trouble; keep the stale entry and let
                    // a later hit retry.
                    old_entry.end_refresh();
                }
                Err(e) => {
                    warn!(
                        name = %question.name,
                        record_type = %question.record_type,
                        error = %e,
                        "Cache renewal failed"
                    );
                    old_entry.end_refresh();
                }
            }
        });
    }
}

/// Effective TTL of a completed resolution: the minimum across its
/// records, or `None` for an empty set (cached under the negative window).
fn effective_ttl(resolution: &Resolution) -> Option<Duration> {
    resolution
        .records
        .iter()
        .map(|record| record.ttl())
        .min()
        .map(|secs| Duration::from_secs(secs as u64))
}

fn store_resolution(cache: &AnswerCache, key: CacheKey, resolution: &Resolution) {
    cache.insert(
        key,
        Arc::clone(&resolution.records),
        resolution.authoritative,
        effective_ttl(resolution),
    );
}

#[async_trait]
impl DnsResolver for CachedResolver {
    async fn resolve(
        &self,
        question: &Question,
        partial: &PartialAnswers,
    ) -> Result<Resolution, DomainError> {
        let key = CacheKey::from_question(question);

        if let Some(cached) = self.check_cache(question, &key) {
            return Ok(cached);
        }

        let (is_leader, mut rx) = match self.inflight.entry(key.clone()) {
            dashmap::Entry::Occupied(e) => {
                let rx = e.get().subscribe();
                drop(e);
                (false, rx)
            }
            dashmap::Entry::Vacant(e) => {
                let (tx, rx) = watch::channel(None::<Arc<Resolution>>);
                e.insert(Arc::new(tx));
                (true, rx)
            }
        };

        if !is_leader {
            // Happy path: leader sent the result before closing the channel.
            if rx.changed().await.is_ok() {
                if let Some(shared) = rx.borrow().clone() {
                    return Ok(Resolution {
                        records: Arc::clone(&shared.records),
                        authoritative: shared.authoritative,
                        cache_hit: false,
                        cacheable: shared.cacheable,
                    });
                }
            }

            // The leader may have sent before we subscribed; the value is
            // still readable via borrow().
            if let Some(shared) = rx.borrow().clone() {
                return Ok(Resolution {
                    records: Arc::clone(&shared.records),
                    authoritative: shared.authoritative,
                    cache_hit: false,
                    cacheable: shared.cacheable,
                });
            }

            // Leader may still have written the cache before dying.
            if let Some(cached) = self.check_cache(question, &key) {
                return Ok(cached);
            }

            // Last resort: resolve on our own.
            let resolution = self.inner.resolve(question, partial).await?;
            if resolution.cacheable {
                store_resolution(&self.cache, key, &resolution);
            }
            return Ok(resolution);
        }

        let mut guard = InflightGuard::new(&self.inflight, key.clone());

        debug!(
            name = %question.name,
            record_type = %question.record_type,
            "Cache MISS"
        );

        let result = self.inner.resolve(question, partial).await;

        match &result {
            Ok(resolution) => {
                if resolution.cacheable {
                    store_resolution(&self.cache, key, resolution);
                }
                if let Some(tx) = guard.complete() {
                    let _ = tx.send(Some(Arc::new(resolution.clone())));
                }
            }
            Err(_) => {
                guard.complete();
            }
        }

        result
    }
}
