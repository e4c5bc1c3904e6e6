//! Answer builders: pure functions from a stored value to a wire record.
//!
//! Builders never touch the store, the cache or the network. A value that
//! cannot produce a well-formed record yields `None` and is omitted from
//! the response.

use hickory_proto::rr::rdata::{A, AAAA, CNAME, DNAME, MX, NS, PTR, SOA, SRV, TXT};
use hickory_proto::rr::{Name, RData, Record};
use keystone_dns_domain::{RecordType, StoredEntry, StoredValue};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Hostname payloads always carry exactly one trailing dot on the wire.
pub fn dotted(host: &str) -> String {
    let mut out = host.trim_end_matches('.').to_string();
    out.push('.');
    out
}

fn target_name(host: &str) -> Option<Name> {
    Name::from_str(&dotted(host)).ok()
}

pub fn answer_a(name: &Name, value: &StoredValue) -> Option<Record> {
    let addr: Ipv4Addr = value.value.parse().ok()?;
    Some(Record::from_rdata(name.clone(), 0, RData::A(A(addr))))
}

pub fn answer_aaaa(name: &Name, value: &StoredValue) -> Option<Record> {
    let addr: Ipv6Addr = value.value.parse().ok()?;
    Some(Record::from_rdata(name.clone(), 0, RData::AAAA(AAAA(addr))))
}

pub fn answer_txt(name: &Name, value: &StoredValue) -> Option<Record> {
    Some(Record::from_rdata(
        name.clone(),
        0,
        RData::TXT(TXT::new(vec![value.value.clone()])),
    ))
}

pub fn answer_ns(name: &Name, value: &StoredValue) -> Option<Record> {
    let target = target_name(&value.value)?;
    Some(Record::from_rdata(name.clone(), 0, RData::NS(NS(target))))
}

pub fn answer_ptr(name: &Name, value: &StoredValue) -> Option<Record> {
    let target = target_name(&value.value)?;
    Some(Record::from_rdata(name.clone(), 0, RData::PTR(PTR(target))))
}

/// Builds the alias record and returns the normalized target for chasing.
pub fn answer_cname(name: &Name, value: &StoredValue) -> Option<(Record, String)> {
    let target = target_name(&value.value)?;
    let chase = dotted(&value.value);
    let record = Record::from_rdata(name.clone(), 0, RData::CNAME(CNAME(target)));
    Some((record, chase))
}

pub fn answer_dname(name: &Name, value: &StoredValue) -> Option<Record> {
    let target = target_name(&value.value)?;
    Some(Record::from_rdata(
        name.clone(),
        0,
        RData::DNAME(DNAME(target)),
    ))
}

pub fn answer_mx(name: &Name, value: &StoredValue) -> Option<Record> {
    let preference = value.attr_u16("priority", 50);
    let exchange_src = match value.attr.get("target") {
        Some(target) => target.as_str(),
        None if !value.value.is_empty() => value.value.as_str(),
        None => return None,
    };
    let exchange = target_name(exchange_src)?;
    Some(Record::from_rdata(
        name.clone(),
        0,
        RData::MX(MX::new(preference, exchange)),
    ))
}

pub fn answer_srv(name: &Name, value: &StoredValue) -> Option<Record> {
    let priority = value.attr_u16("priority", 50);
    let weight = value.attr_u16("weight", 50);
    let mut port = value.attr_u16("port", 0);

    let target = match value.attr.get("target") {
        Some(target) => target_name(target)?,
        None if !value.value.is_empty() => {
            // Composite `host:port` form; an explicit `port` attribute wins
            // over the suffix.
            let (host, suffix) = match value.value.split_once(':') {
                Some((host, suffix)) => (host, Some(suffix)),
                None => (value.value.as_str(), None),
            };
            if !value.attr.contains_key("port") {
                if let Some(parsed) = suffix.and_then(|s| s.parse().ok()) {
                    port = parsed;
                }
            }
            target_name(host)?
        }
        None => return None,
    };

    Some(Record::from_rdata(
        name.clone(),
        0,
        RData::SRV(SRV::new(priority, weight, port, target)),
    ))
}

/// One SOA record per entry, built from `meta` rather than the value list.
/// The serial is the current Unix time; the remaining timers only matter
/// for master/slave transfers, which this server does not speak.
pub fn answer_soa(name: &Name, entry: &StoredEntry) -> Option<Record> {
    let ns = target_name(entry.meta.get("ns").map(String::as_str).unwrap_or(""))?;
    let mbox = target_name(entry.meta.get("mbox").map(String::as_str).unwrap_or(""))?;
    let serial = unix_now() as u32;
    Some(Record::from_rdata(
        name.clone(),
        0,
        RData::SOA(SOA::new(ns, mbox, serial, 60, 60, 60, 60)),
    ))
}

/// Dispatch for the value-iterating record types. CNAME, DNAME and SOA
/// have dedicated entry points because their callers need more than the
/// record itself.
pub fn build_answer(record_type: RecordType, name: &Name, value: &StoredValue) -> Option<Record> {
    match record_type {
        RecordType::A => answer_a(name, value),
        RecordType::AAAA => answer_aaaa(name, value),
        RecordType::TXT => answer_txt(name, value),
        RecordType::NS => answer_ns(name, value),
        RecordType::PTR => answer_ptr(name, value),
        RecordType::MX => answer_mx(name, value),
        RecordType::SRV => answer_srv(name, value),
        RecordType::CNAME => answer_cname(name, value).map(|(record, _)| record),
        RecordType::DNAME => answer_dname(name, value),
        RecordType::SOA => None,
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
