use async_trait::async_trait;
use compact_str::CompactString;
use dashmap::DashMap;
use keystone_dns_application::ports::RecordStore;
use keystone_dns_domain::{
    canonical_name, DomainError, RecordType, StaticRecord, StoredEntry, StoredValue,
};
use rustc_hash::FxBuildHasher;
use std::str::FromStr;
use std::time::{Duration, SystemTime};
use tracing::{info, warn};

/// In-memory record store adapter.
///
/// The shipped store for standalone deployments (seeded from the config
/// file) and the test double behind the `RecordStore` port; networked
/// record databases implement the same port. Keys are normalized the way
/// the port requires, so lookups match case-insensitively with or without
/// a trailing dot.
#[derive(Default)]
pub struct MemoryRecordStore {
    entries: DashMap<(CompactString, RecordType), StoredEntry, FxBuildHasher>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(records: &[StaticRecord]) -> Self {
        let store = Self::new();

        for record in records {
            let record_type = match RecordType::from_str(&record.record_type) {
                Ok(rt) => rt,
                Err(e) => {
                    // Config validation rejects these at startup; guard anyway.
                    warn!(name = %record.name, error = %e, "Skipping seed record");
                    continue;
                }
            };

            let mut value = StoredValue::new(record.value.clone().unwrap_or_default());
            value.expiration = record
                .expires_in_secs
                .map(|secs| SystemTime::now() + Duration::from_secs(secs));
            value.attr = record.attr.clone();

            store.upsert(&record.name, record_type, value, record.ttl, &record.meta);
        }

        info!(entries = store.entries.len(), "Record store seeded");
        store
    }

    /// Merges one value into the entry for (name, type), creating it on
    /// first sight.
    pub fn upsert(
        &self,
        name: &str,
        record_type: RecordType,
        value: StoredValue,
        ttl: Option<u32>,
        meta: &std::collections::HashMap<String, String>,
    ) {
        let key = (CompactString::from(canonical_name(name)), record_type);
        let mut entry = self.entries.entry(key).or_default();

        if let Some(ttl) = ttl {
            entry.ttl = ttl;
        }
        entry
            .meta
            .extend(meta.iter().map(|(k, v)| (k.clone(), v.clone())));
        if !value.value.is_empty() || !value.attr.is_empty() {
            entry.values.push(value);
        }
    }

    /// Replaces the whole entry for (name, type); test seam.
    pub fn insert_entry(&self, name: &str, record_type: RecordType, entry: StoredEntry) {
        let key = (CompactString::from(canonical_name(name)), record_type);
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn fetch(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> Result<StoredEntry, DomainError> {
        let key = (CompactString::from(canonical_name(name)), record_type);
        self.entries
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or(DomainError::RecordNotFound)
    }

    async fn exists(&self, name: &str, record_type: RecordType) -> Result<bool, DomainError> {
        let key = (CompactString::from(canonical_name(name)), record_type);
        Ok(self.entries.contains_key(&key))
    }
}
