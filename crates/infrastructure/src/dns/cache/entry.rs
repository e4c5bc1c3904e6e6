use hickory_proto::rr::Record;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// One cached answer set.
///
/// `stale_at <= invalid_at` always. Between the two the entry may still be
/// served while a background renewal runs; past `invalid_at` it is dead.
#[derive(Debug)]
pub struct CacheEntry {
    pub answers: Arc<Vec<Record>>,
    pub authoritative: bool,
    pub stale_at: Instant,
    pub invalid_at: Instant,
    pub refreshing: AtomicBool,
    pub last_access: AtomicU64,
}

impl CacheEntry {
    pub fn new(
        answers: Arc<Vec<Record>>,
        authoritative: bool,
        stale_at: Instant,
        invalid_at: Instant,
    ) -> Self {
        Self {
            answers,
            authoritative,
            stale_at,
            invalid_at: invalid_at.max(stale_at),
            refreshing: AtomicBool::new(false),
            last_access: AtomicU64::new(unix_secs()),
        }
    }

    pub fn is_fresh(&self, now: Instant) -> bool {
        now < self.stale_at
    }

    pub fn is_usable(&self, now: Instant) -> bool {
        now < self.invalid_at
    }

    /// Whole seconds until staleness, clamped so a served record never
    /// carries a TTL of zero.
    pub fn remaining_ttl(&self, now: Instant) -> u32 {
        self.stale_at
            .saturating_duration_since(now)
            .as_secs()
            .max(1) as u32
    }

    /// CAS guard so only one renewal per entry is ever in flight.
    pub fn try_begin_refresh(&self) -> bool {
        !self.refreshing.swap(true, AtomicOrdering::AcqRel)
    }

    pub fn end_refresh(&self) {
        self.refreshing.store(false, AtomicOrdering::Release);
    }

    pub fn record_access(&self) {
        self.last_access.store(unix_secs(), AtomicOrdering::Relaxed);
    }
}

fn unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
