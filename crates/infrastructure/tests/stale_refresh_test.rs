use async_trait::async_trait;
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record};
use keystone_dns_application::ports::{DnsResolver, PartialAnswers, Resolution};
use keystone_dns_domain::{DomainError, Question, RecordType};
use keystone_dns_infrastructure::dns::cache::{AnswerCache, AnswerCacheConfig};
use keystone_dns_infrastructure::dns::CachedResolver;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

struct MockResolver {
    call_count: Arc<AtomicUsize>,
    ttl: u32,
    empty: bool,
}

impl MockResolver {
    fn with_ttl(ttl: u32) -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
            ttl,
            empty: false,
        }
    }

    fn negative() -> Self {
        Self {
            call_count: Arc::new(AtomicUsize::new(0)),
            ttl: 0,
            empty: true,
        }
    }

    fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DnsResolver for MockResolver {
    async fn resolve(
        &self,
        question: &Question,
        _partial: &PartialAnswers,
    ) -> Result<Resolution, DomainError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if self.empty {
            return Ok(Resolution::empty());
        }
        let record = Record::from_rdata(
            Name::from_str(&question.name).unwrap(),
            self.ttl,
            RData::A(A("10.0.0.7".parse().unwrap())),
        );
        Ok(Resolution::new(vec![record], true))
    }
}

fn short_lived_cache() -> Arc<AnswerCache> {
    Arc::new(AnswerCache::new(AnswerCacheConfig {
        max_entries: 100,
        grace: Duration::from_secs(2),
        negative_retention: Duration::from_secs(1),
    }))
}

#[tokio::test]
async fn stale_entry_served_immediately_and_renewed_in_background() {
    let mock = Arc::new(MockResolver::with_ttl(1));
    let resolver = Arc::new(CachedResolver::new(
        Arc::clone(&mock) as Arc<dyn DnsResolver>,
        short_lived_cache(),
    ));
    let question = Question::new("stale.example.com", RecordType::A);

    resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert_eq!(mock.call_count(), 1);

    // Past the 1s TTL but inside the 2s grace window.
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let stale = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(stale.cache_hit, "stale entry must be served, not re-resolved inline");
    assert_eq!(stale.records.len(), 1);
    assert!(stale.records[0].ttl() >= 1);

    // Give the background renewal a moment to finish.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(mock.call_count(), 2, "stale hit must schedule exactly one renewal");

    let renewed = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(renewed.cache_hit);
    assert_eq!(mock.call_count(), 2, "renewed entry serves fresh hits");
}

#[tokio::test]
async fn repeated_stale_hits_renew_only_once() {
    let mock = Arc::new(MockResolver::with_ttl(1));
    let resolver = Arc::new(CachedResolver::new(
        Arc::clone(&mock) as Arc<dyn DnsResolver>,
        short_lived_cache(),
    ));
    let question = Question::new("once.example.com", RecordType::A);

    resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(1200)).await;

    // Burst of stale reads before the renewal can land.
    let r1 = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    let r2 = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    let r3 = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(r1.cache_hit && r2.cache_hit && r3.cache_hit);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(
        mock.call_count(),
        2,
        "the refresh CAS must allow a single renewal"
    );
}

#[tokio::test]
async fn entry_past_grace_is_not_served() {
    let mock = Arc::new(MockResolver::with_ttl(1));
    let resolver = Arc::new(CachedResolver::new(
        Arc::clone(&mock) as Arc<dyn DnsResolver>,
        short_lived_cache(),
    ));
    let question = Question::new("dead.example.com", RecordType::A);

    resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();

    // TTL 1s + grace 2s = invalid after 3s.
    tokio::time::sleep(Duration::from_millis(3200)).await;

    let result = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(!result.cache_hit, "invalid entries must resolve from scratch");
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn empty_results_are_retained_for_the_negative_window() {
    let mock = Arc::new(MockResolver::negative());
    let resolver = Arc::new(CachedResolver::new(
        Arc::clone(&mock) as Arc<dyn DnsResolver>,
        short_lived_cache(),
    ));
    let question = Question::new("missing.example.com", RecordType::A);

    let first = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(first.records.is_empty());

    let second = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(second.cache_hit, "negative result must be served from cache");
    assert!(second.records.is_empty());
    assert_eq!(mock.call_count(), 1);

    // Past the 1s negative retention the entry is gone.
    tokio::time::sleep(Duration::from_millis(1200)).await;
    let third = resolver
        .resolve(&question, &PartialAnswers::new())
        .await
        .unwrap();
    assert!(!third.cache_hit);
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn sweep_removes_only_invalid_entries() {
    let cache = short_lived_cache();
    let record = Record::from_rdata(
        Name::from_str("keep.example.com.").unwrap(),
        300,
        RData::A(A("10.0.0.1".parse().unwrap())),
    );

    cache.insert(
        keystone_dns_infrastructure::dns::CacheKey::new("keep.example.com.", RecordType::A),
        Arc::new(vec![record]),
        false,
        Some(Duration::from_secs(300)),
    );
    cache.insert(
        keystone_dns_infrastructure::dns::CacheKey::new("drop.example.com.", RecordType::A),
        Arc::new(vec![]),
        false,
        Some(Duration::ZERO),
    );

    // The second entry's grace is 2s; wait it out.
    tokio::time::sleep(Duration::from_millis(2200)).await;

    let removed = cache.sweep_invalid();
    assert_eq!(removed, 1);
    assert_eq!(cache.len(), 1);
}
