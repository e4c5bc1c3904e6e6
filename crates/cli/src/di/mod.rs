use keystone_dns_application::use_cases::HandleQuestionUseCase;
use keystone_dns_domain::Config;
use keystone_dns_infrastructure::dns::cache::AnswerCacheConfig;
use keystone_dns_infrastructure::dns::{
    AnswerCache, AuthorityOracle, CacheMaintenance, CachedResolver, CoreResolver, DnsServer,
    ForwarderClient,
};
use keystone_dns_infrastructure::store::MemoryRecordStore;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Dependency wiring: store -> oracle/forwarder -> core -> cache -> use case.
pub struct DnsServices {
    pub cache: Arc<AnswerCache>,
    pub use_case: Arc<HandleQuestionUseCase>,
    recursion_available: bool,
}

impl DnsServices {
    pub fn new(config: &Config) -> Self {
        info!("Initializing DNS services");

        let store = Arc::new(MemoryRecordStore::from_config(&config.store.records));

        let authority = Arc::new(AuthorityOracle::new(
            store.clone(),
            &config.dns.authoritative_zones,
        ));

        let forwarder = Arc::new(ForwarderClient::new(
            config.dns.forwarders.clone(),
            Duration::from_millis(config.dns.forward_timeout_ms),
        ));

        let core = Arc::new(CoreResolver::new(
            store,
            authority,
            forwarder,
            config.dns.default_ttl,
        ));

        let cache = Arc::new(AnswerCache::new(AnswerCacheConfig {
            max_entries: config.dns.cache_max_entries,
            grace: Duration::from_secs(config.dns.cache_grace_secs),
            negative_retention: Duration::from_secs(config.dns.negative_retention_secs),
        }));

        let resolver = Arc::new(CachedResolver::new(core, cache.clone()));

        let use_case = Arc::new(HandleQuestionUseCase::new(
            resolver,
            Duration::from_millis(config.dns.query_deadline_ms),
        ));

        info!(
            forwarding = config.dns.forwarding_enabled(),
            default_ttl = config.dns.default_ttl,
            cache_max_entries = config.dns.cache_max_entries,
            "DNS services ready"
        );

        Self {
            cache,
            use_case,
            recursion_available: config.dns.forwarding_enabled(),
        }
    }

    pub fn start_background_tasks(&self, config: &Config) {
        CacheMaintenance::new(
            self.cache.clone(),
            Duration::from_secs(config.dns.cache_maintenance_interval_secs),
        )
        .start();
    }

    pub fn dns_server(&self) -> Arc<DnsServer> {
        Arc::new(DnsServer::new(
            self.use_case.clone(),
            self.recursion_available,
        ))
    }
}
