use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    /// Applied when neither the entry nor its values carry a TTL.
    #[serde(default = "default_ttl")]
    pub default_ttl: u32,

    /// Upstream resolvers tried in order for non-authoritative names.
    /// A leading `"!"` disables forwarding entirely.
    #[serde(default)]
    pub forwarders: Vec<String>,

    /// Deadline for a single upstream exchange.
    #[serde(default = "default_forward_timeout_ms")]
    pub forward_timeout_ms: u64,

    /// Deadline for answering one question end to end.
    #[serde(default = "default_query_deadline_ms")]
    pub query_deadline_ms: u64,

    /// Zones we claim authority over without consulting the store.
    /// The authority walk over SOA/DNAME records still applies on top.
    #[serde(default)]
    pub authoritative_zones: Vec<String>,

    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// How long a cached answer may be served stale while a renewal runs.
    #[serde(default = "default_cache_grace_secs")]
    pub cache_grace_secs: u64,

    /// Retention for empty results.
    #[serde(default = "default_negative_retention_secs")]
    pub negative_retention_secs: u64,

    #[serde(default = "default_cache_maintenance_interval_secs")]
    pub cache_maintenance_interval_secs: u64,
}

impl DnsConfig {
    /// True unless forwarding is disabled by the `"!"` sentinel or an
    /// empty upstream list.
    pub fn forwarding_enabled(&self) -> bool {
        match self.forwarders.first() {
            None => false,
            Some(first) => first.trim() != "!",
        }
    }
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            default_ttl: default_ttl(),
            forwarders: vec![],
            forward_timeout_ms: default_forward_timeout_ms(),
            query_deadline_ms: default_query_deadline_ms(),
            authoritative_zones: vec![],
            cache_max_entries: default_cache_max_entries(),
            cache_grace_secs: default_cache_grace_secs(),
            negative_retention_secs: default_negative_retention_secs(),
            cache_maintenance_interval_secs: default_cache_maintenance_interval_secs(),
        }
    }
}

fn default_ttl() -> u32 {
    10_800
}

fn default_forward_timeout_ms() -> u64 {
    2_000
}

fn default_query_deadline_ms() -> u64 {
    5_000
}

fn default_cache_max_entries() -> usize {
    10_000
}

fn default_cache_grace_secs() -> u64 {
    60
}

fn default_negative_retention_secs() -> u64 {
    30
}

fn default_cache_maintenance_interval_secs() -> u64 {
    300
}
