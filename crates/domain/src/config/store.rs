use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seed data for the in-memory record store adapter.
///
/// Production deployments point the server at a networked record database
/// instead; these records exist so a standalone instance can serve zones
/// straight from its config file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StoreConfig {
    #[serde(default)]
    pub records: Vec<StaticRecord>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticRecord {
    pub name: String,

    pub record_type: String,

    /// Record payload; optional because SOA entries carry data in `meta`.
    #[serde(default)]
    pub value: Option<String>,

    #[serde(default)]
    pub ttl: Option<u32>,

    /// Relative expiry in seconds from process start, mainly for
    /// short-lived registrations.
    #[serde(default)]
    pub expires_in_secs: Option<u64>,

    #[serde(default)]
    pub attr: HashMap<String, String>,

    /// Entry-level attributes; merged across records of the same key.
    #[serde(default)]
    pub meta: HashMap<String, String>,
}
