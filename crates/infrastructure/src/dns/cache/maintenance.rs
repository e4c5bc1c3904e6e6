use super::storage::AnswerCache;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Periodic sweep removing entries past their invalid deadline, so a quiet
/// cache does not hold dead answers until the next eviction pressure.
pub struct CacheMaintenance {
    cache: Arc<AnswerCache>,
    interval: Duration,
}

impl CacheMaintenance {
    pub fn new(cache: Arc<AnswerCache>, interval: Duration) -> Self {
        Self { cache, interval }
    }

    pub fn start(self) -> JoinHandle<()> {
        info!(
            interval_secs = self.interval.as_secs(),
            "Cache maintenance task started"
        );
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = self.cache.sweep_invalid();
                if removed > 0 {
                    debug!(
                        removed = removed,
                        size = self.cache.len(),
                        "Swept invalid cache entries"
                    );
                }
            }
        })
    }
}
