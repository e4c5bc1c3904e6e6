use compact_str::CompactString;
use keystone_dns_domain::{Question, RecordType};
use std::hash::{Hash, Hasher};

/// Normalized question used to index the answer cache.
#[derive(Clone, Debug, Eq)]
pub struct CacheKey {
    pub name: CompactString,
    pub record_type: RecordType,
}

impl CacheKey {
    #[inline]
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: CompactString::from(name),
            record_type,
        }
    }

    #[inline]
    pub fn from_question(question: &Question) -> Self {
        Self::new(&question.name, question.record_type)
    }
}

impl Hash for CacheKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.as_str().hash(state);
        std::mem::discriminant(&self.record_type).hash(state);
    }
}

impl PartialEq for CacheKey {
    #[inline]
    fn eq(&self, other: &CacheKey) -> bool {
        self.record_type == other.record_type && self.name == other.name
    }
}
