use async_trait::async_trait;
use hickory_proto::rr::Record;
use keystone_dns_domain::{DomainError, Question};
use std::sync::{Arc, Mutex};

/// Outcome of resolving one question.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub records: Arc<Vec<Record>>,
    /// Whether this server holds authority for the question's zone.
    pub authoritative: bool,
    pub cache_hit: bool,
    /// False when the answer was produced under transient store trouble
    /// and must not be retained.
    pub cacheable: bool,
}

impl Resolution {
    pub fn new(records: Vec<Record>, authoritative: bool) -> Self {
        Self {
            records: Arc::new(records),
            authoritative,
            cache_hit: false,
            cacheable: true,
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![], false)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Shared accumulator for answers finished before a resolution completes.
///
/// Resolvers publish each completed batch as they go; when the question
/// deadline cancels the resolving future, the caller reads back whatever
/// had been produced instead of discarding it.
#[derive(Debug, Clone, Default)]
pub struct PartialAnswers {
    records: Arc<Mutex<Vec<Record>>>,
}

impl PartialAnswers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, records: &[Record]) {
        if let Ok(mut guard) = self.records.lock() {
            guard.extend_from_slice(records);
        }
    }

    pub fn take(&self) -> Vec<Record> {
        self.records
            .lock()
            .map(|mut guard| std::mem::take(&mut *guard))
            .unwrap_or_default()
    }
}

#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolves one question. Finished answers are also published to
    /// `partial` along the way, which the caller reads when the question
    /// deadline cuts this future down mid-resolution.
    async fn resolve(
        &self,
        question: &Question,
        partial: &PartialAnswers,
    ) -> Result<Resolution, DomainError>;
}
