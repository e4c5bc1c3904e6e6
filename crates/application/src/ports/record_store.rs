use async_trait::async_trait;
use keystone_dns_domain::{DomainError, RecordType, StoredEntry};

/// Read interface to the external record database.
///
/// Implementations own their remote I/O, retries and connection health.
/// `fetch` must be safe for concurrent callers and must return
/// [`DomainError::RecordNotFound`] for missing keys so callers can tell
/// absence apart from store trouble. Name matching is case-insensitive,
/// with or without the trailing dot.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(&self, name: &str, record_type: RecordType)
        -> Result<StoredEntry, DomainError>;

    async fn exists(&self, name: &str, record_type: RecordType) -> Result<bool, DomainError>;
}
