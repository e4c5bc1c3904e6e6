use std::collections::HashMap;
use std::time::SystemTime;

/// One record set as read from the record store, an immutable snapshot.
#[derive(Debug, Clone, Default)]
pub struct StoredEntry {
    /// Entry-level TTL in seconds; 0 means "use the server default".
    pub ttl: u32,
    pub values: Vec<StoredValue>,
    /// Entry-level attributes; SOA reads `ns` and `mbox` from here.
    pub meta: HashMap<String, String>,
}

/// One record body within an entry.
#[derive(Debug, Clone, Default)]
pub struct StoredValue {
    /// Primary payload; its meaning depends on the record type
    /// (an address literal, a hostname, free text, ...).
    pub value: String,
    /// Per-value TTL in seconds; 0 means unset.
    pub ttl: u32,
    /// Absolute expiry; values past it are never emitted.
    pub expiration: Option<SystemTime>,
    /// Per-value attributes, e.g. `priority`/`weight`/`port`/`target`.
    pub attr: HashMap<String, String>,
}

impl StoredValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Parsed numeric attribute, or `default` when absent or malformed.
    pub fn attr_u16(&self, key: &str, default: u16) -> u16 {
        self.attr
            .get(key)
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}

impl StoredEntry {
    pub fn with_values(values: Vec<StoredValue>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }
}
