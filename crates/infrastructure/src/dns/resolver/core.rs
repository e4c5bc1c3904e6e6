use crate::dns::answers;
use crate::dns::authority::AuthorityOracle;
use crate::dns::forwarding::Forwarder;
use async_trait::async_trait;
use hickory_proto::rr::{Name, Record};
use keystone_dns_application::ports::{DnsResolver, PartialAnswers, RecordStore, Resolution};
use keystone_dns_domain::{DomainError, Question, RecordType, StoredEntry};
use std::str::FromStr;
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, warn};

/// Alias chains longer than this are cut off rather than followed.
const MAX_CHASE_DEPTH: usize = 8;

/// Answers one question from the record store, chasing aliases and falling
/// through to the forwarders when the name is outside our authority.
pub struct CoreResolver {
    store: Arc<dyn RecordStore>,
    authority: Arc<AuthorityOracle>,
    forwarder: Arc<dyn Forwarder>,
    default_ttl: u32,
}

/// Outcome of building one chase level.
struct Level {
    records: Vec<Record>,
    /// Normalized CNAME target to chase next, if any.
    chase: Option<String>,
    /// A DNAME matched; subtree expansion is handled by the forwarders.
    dname: bool,
}

impl CoreResolver {
    pub fn new(
        store: Arc<dyn RecordStore>,
        authority: Arc<AuthorityOracle>,
        forwarder: Arc<dyn Forwarder>,
        default_ttl: u32,
    ) -> Self {
        Self {
            store,
            authority,
            forwarder,
            default_ttl,
        }
    }

    /// Issues the CNAME probe and the direct-type probe concurrently and
    /// picks the winner by record-type priority, never by completion
    /// order: a CNAME displaces any other type at the same name.
    ///
    /// The second bool reports transient store trouble, which poisons
    /// cacheability for this question.
    async fn fetch_best_entry(
        &self,
        name: &str,
        record_type: RecordType,
    ) -> (Option<(StoredEntry, RecordType)>, bool) {
        let mut transient = false;

        let probes: Vec<(Result<StoredEntry, DomainError>, RecordType)> =
            if record_type == RecordType::CNAME {
                vec![(
                    self.store.fetch(name, RecordType::CNAME).await,
                    RecordType::CNAME,
                )]
            } else {
                let (cname, direct) = tokio::join!(
                    self.store.fetch(name, RecordType::CNAME),
                    self.store.fetch(name, record_type),
                );
                vec![(cname, RecordType::CNAME), (direct, record_type)]
            };

        for (result, matched_type) in probes {
            match result {
                Ok(entry) => return (Some((entry, matched_type)), transient),
                Err(DomainError::RecordNotFound) => {}
                Err(e) => {
                    warn!(
                        name = %name,
                        record_type = %matched_type,
                        error = %e,
                        "Record store probe failed"
                    );
                    transient = true;
                }
            }
        }

        (None, transient)
    }

    /// Builds every answer one entry yields. The level TTL starts from the
    /// entry TTL (or the server default) and is reduced by per-value TTLs
    /// and expirations before being stamped uniformly on this level's
    /// records. Chased levels run this again and keep their own TTLs.
    fn build_level(&self, owner: &Name, entry: &StoredEntry, matched_type: RecordType) -> Level {
        let mut level_ttl = if entry.ttl > 0 {
            entry.ttl
        } else {
            self.default_ttl
        };
        let mut records = Vec::new();
        let mut chase = None;
        let mut dname = false;

        if matched_type == RecordType::SOA {
            if let Some(record) = answers::answer_soa(owner, entry) {
                records.push(record);
            }
        } else {
            let now = SystemTime::now();
            for value in &entry.values {
                if let Some(expiration) = value.expiration {
                    let Ok(remaining) = expiration.duration_since(now) else {
                        // Already expired; never emitted.
                        continue;
                    };
                    let remaining = remaining.as_secs() as u32;
                    if remaining < level_ttl {
                        level_ttl = remaining;
                    }
                }
                if value.ttl > 0 && value.ttl < level_ttl {
                    level_ttl = value.ttl;
                }

                match matched_type {
                    RecordType::CNAME => {
                        if let Some((record, target)) = answers::answer_cname(owner, value) {
                            records.push(record);
                            if chase.is_none() {
                                chase = Some(target);
                            }
                        }
                    }
                    RecordType::DNAME => {
                        if let Some(record) = answers::answer_dname(owner, value) {
                            records.push(record);
                            dname = true;
                        }
                    }
                    other => {
                        if let Some(record) = answers::build_answer(other, owner, value) {
                            records.push(record);
                        }
                    }
                }
            }
        }

        for record in &mut records {
            record.set_ttl(level_ttl);
        }

        Level {
            records,
            chase,
            dname,
        }
    }
}

#[async_trait]
impl DnsResolver for CoreResolver {
    async fn resolve(
        &self,
        question: &Question,
        partial: &PartialAnswers,
    ) -> Result<Resolution, DomainError> {
        let mut answers: Vec<Record> = Vec::new();
        let mut cacheable = true;
        let mut wants_forwarder = false;
        let mut name = question.name.to_string();
        let mut depth = 0;

        loop {
            let Ok(owner) = Name::from_str(&name) else {
                warn!(name = %name, "Unresolvable owner name");
                break;
            };

            let (best, transient) = self.fetch_best_entry(&name, question.record_type).await;
            cacheable &= !transient;

            let Some((entry, matched_type)) = best else {
                // Nothing local; only the original name may fall through
                // to the forwarders.
                if depth == 0 {
                    wants_forwarder = true;
                }
                break;
            };

            debug!(
                name = %name,
                record_type = %matched_type,
                depth = depth,
                "Record store match"
            );

            let level = self.build_level(&owner, &entry, matched_type);
            // Completed levels survive a deadline that cancels us mid-chase.
            partial.publish(&level.records);
            answers.extend(level.records);
            if depth == 0 {
                wants_forwarder = level.dname;
            }

            match level.chase {
                Some(target) if depth < MAX_CHASE_DEPTH => {
                    name = target;
                    depth += 1;
                }
                Some(target) => {
                    warn!(
                        name = %question.name,
                        target = %target,
                        depth = depth,
                        "Alias chase depth exceeded, stopping"
                    );
                    break;
                }
                None => break,
            }
        }

        let authoritative = self.authority.is_authoritative(&question.name).await;

        if wants_forwarder && !authoritative {
            debug!(
                name = %question.name,
                record_type = %question.record_type,
                "Deferring to forwarders"
            );
            answers.extend(self.forwarder.forward(question).await);
        }

        Ok(Resolution {
            records: Arc::new(answers),
            authoritative,
            cache_hit: false,
            cacheable,
        })
    }
}
