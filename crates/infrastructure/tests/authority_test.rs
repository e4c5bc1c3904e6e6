use async_trait::async_trait;
use keystone_dns_application::ports::RecordStore;
use keystone_dns_domain::{DomainError, RecordType, StoredEntry};
use keystone_dns_infrastructure::dns::AuthorityOracle;
use keystone_dns_infrastructure::store::MemoryRecordStore;
use std::sync::Arc;

struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn fetch(
        &self,
        _name: &str,
        _record_type: RecordType,
    ) -> Result<StoredEntry, DomainError> {
        Err(DomainError::StoreUnavailable("backend down".to_string()))
    }

    async fn exists(&self, _name: &str, _record_type: RecordType) -> Result<bool, DomainError> {
        Err(DomainError::StoreUnavailable("backend down".to_string()))
    }
}

#[tokio::test]
async fn soa_grants_authority_for_enclosed_names() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert_entry("example.com", RecordType::SOA, StoredEntry::default());
    let oracle = AuthorityOracle::new(store, &[]);

    assert!(oracle.is_authoritative("host.example.com").await);
    assert!(oracle.is_authoritative("deep.sub.example.com").await);
    assert!(oracle.is_authoritative("example.com").await);
    assert!(!oracle.is_authoritative("other.org").await);
}

#[tokio::test]
async fn tld_is_never_probed() {
    let store = Arc::new(MemoryRecordStore::new());
    // Even a (nonsense) SOA at the bare TLD must not be found by the walk.
    store.insert_entry("com", RecordType::SOA, StoredEntry::default());
    let oracle = AuthorityOracle::new(store, &[]);

    assert!(!oracle.is_authoritative("host.example.com").await);
    assert!(!oracle.is_authoritative("com").await);
}

#[tokio::test]
async fn dname_grants_authority() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert_entry("legacy.example.net", RecordType::DNAME, StoredEntry::default());
    let oracle = AuthorityOracle::new(store, &[]);

    assert!(oracle.is_authoritative("host.legacy.example.net").await);
    assert!(!oracle.is_authoritative("host.example.net").await);
}

#[tokio::test]
async fn configured_zone_hints_short_circuit_the_walk() {
    let store = Arc::new(MemoryRecordStore::new());
    let oracle = AuthorityOracle::new(store, &["corp.internal".to_string()]);

    assert!(oracle.is_authoritative("db.corp.internal").await);
    assert!(oracle.is_authoritative("corp.internal.").await);
    assert!(!oracle.is_authoritative("notcorp.internal").await);
}

#[tokio::test]
async fn store_errors_count_as_no_hit() {
    let oracle = AuthorityOracle::new(Arc::new(FailingStore), &[]);
    assert!(!oracle.is_authoritative("host.example.com").await);
}

#[tokio::test]
async fn case_and_trailing_dot_do_not_matter() {
    let store = Arc::new(MemoryRecordStore::new());
    store.insert_entry("Example.COM.", RecordType::SOA, StoredEntry::default());
    let oracle = AuthorityOracle::new(store, &[]);

    assert!(oracle.is_authoritative("HOST.EXAMPLE.COM.").await);
    assert!(oracle.is_authoritative("host.example.com").await);
}
