use crate::ports::{DnsResolver, PartialAnswers, Resolution};
use keystone_dns_domain::Question;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Answers one question within the configured deadline.
///
/// DNS-level failure is conveyed through an empty answer set; the frontend
/// turns that into NXDOMAIN. A deadline that fires mid-resolution returns
/// the answers completed so far rather than discarding them. Callers
/// always get a `Resolution` back.
pub struct HandleQuestionUseCase {
    resolver: Arc<dyn DnsResolver>,
    query_deadline: Duration,
}

impl HandleQuestionUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>, query_deadline: Duration) -> Self {
        Self {
            resolver,
            query_deadline,
        }
    }

    pub async fn execute(&self, question: &Question) -> Resolution {
        let start = Instant::now();
        let partial = PartialAnswers::new();

        let outcome = tokio::time::timeout(
            self.query_deadline,
            self.resolver.resolve(question, &partial),
        )
        .await;

        match outcome {
            Ok(Ok(resolution)) => {
                debug!(
                    name = %question.name,
                    record_type = %question.record_type,
                    answers = resolution.records.len(),
                    authoritative = resolution.authoritative,
                    cache_hit = resolution.cache_hit,
                    elapsed_us = start.elapsed().as_micros() as u64,
                    "Question answered"
                );
                resolution
            }
            Ok(Err(e)) => {
                warn!(
                    name = %question.name,
                    record_type = %question.record_type,
                    error = %e,
                    "Resolution failed, answering empty"
                );
                Resolution::empty()
            }
            Err(_) => {
                let records = partial.take();
                warn!(
                    name = %question.name,
                    record_type = %question.record_type,
                    deadline_ms = self.query_deadline.as_millis() as u64,
                    partial_answers = records.len(),
                    "Question deadline exceeded, answering with completed work"
                );
                Resolution {
                    records: Arc::new(records),
                    authoritative: false,
                    cache_hit: false,
                    cacheable: false,
                }
            }
        }
    }
}
