use super::RecordType;
use std::sync::Arc;

/// Canonical form of a DNS name: ASCII-lowercased, exactly one trailing dot.
///
/// Any number of trailing dots collapses to one, so `"HOST.Example.COM..."`
/// and `"host.example.com"` canonicalize identically.
pub fn canonical_name(name: &str) -> String {
    let mut out = name.trim_end_matches('.').to_ascii_lowercase();
    out.push('.');
    out
}

/// One DNS question, class INET implied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl Question {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: Arc::from(canonical_name(name)),
            record_type,
        }
    }

    /// Same question asked of a different name; used when chasing aliases.
    pub fn with_name(&self, name: &str) -> Self {
        Self::new(name, self.record_type)
    }
}
