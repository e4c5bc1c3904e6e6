use keystone_dns_application::ports::RecordStore;
use keystone_dns_domain::{canonical_name, RecordType};
use std::sync::Arc;
use tracing::{debug, warn};

/// Decides whether this server holds authority for the zone enclosing a
/// name.
///
/// Configured zone hints are consulted first; otherwise every suffix of
/// the name down to, but excluding, the TLD is probed for an SOA or DNAME
/// entry. Store errors count as "no hit".
pub struct AuthorityOracle {
    store: Arc<dyn RecordStore>,
    zone_hints: Vec<String>,
}

impl AuthorityOracle {
    pub fn new(store: Arc<dyn RecordStore>, zone_hints: &[String]) -> Self {
        Self {
            store,
            zone_hints: zone_hints.iter().map(|z| canonical_name(z)).collect(),
        }
    }

    pub async fn is_authoritative(&self, name: &str) -> bool {
        let name = canonical_name(name);

        for zone in &self.zone_hints {
            if name == *zone || name.ends_with(&format!(".{}", zone)) {
                debug!(name = %name, zone = %zone, "Authority via configured zone");
                return true;
            }
        }

        let trimmed = name.trim_end_matches('.');
        if trimmed.is_empty() {
            return false;
        }
        let labels: Vec<&str> = trimmed.split('.').collect();

        // Walk host.example.com -> example.com, never the bare TLD.
        for i in 0..labels.len().saturating_sub(1) {
            let zone = labels[i..].join(".");
            for record_type in [RecordType::SOA, RecordType::DNAME] {
                match self.store.exists(&zone, record_type).await {
                    Ok(true) => {
                        debug!(name = %name, zone = %zone, record_type = %record_type, "Authority found");
                        return true;
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!(
                            zone = %zone,
                            record_type = %record_type,
                            error = %e,
                            "Authority probe failed, treating as no hit"
                        );
                    }
                }
            }
        }

        false
    }
}
