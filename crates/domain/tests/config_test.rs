use keystone_dns_domain::{CliOverrides, Config};

#[test]
fn defaults_match_documented_values() {
    let config = Config::default();
    assert_eq!(config.server.bind_address, "0.0.0.0");
    assert_eq!(config.server.dns_port, 53);
    assert_eq!(config.dns.default_ttl, 10_800);
    assert_eq!(config.dns.query_deadline_ms, 5_000);
    assert_eq!(config.dns.negative_retention_secs, 30);
    assert!(config.dns.forwarders.is_empty());
    assert!(!config.dns.forwarding_enabled());
}

#[test]
fn parses_full_toml() {
    let toml = r#"
        [server]
        bind_address = "127.0.0.1"
        dns_port = 5353

        [dns]
        default_ttl = 300
        forwarders = ["8.8.8.8:53", "1.1.1.1:53"]
        authoritative_zones = ["example.com"]

        [logging]
        level = "debug"

        [[store.records]]
        name = "host.example.com"
        record_type = "A"
        value = "10.0.0.7"

        [[store.records]]
        name = "example.com"
        record_type = "SOA"
        meta = { ns = "ns1.example.com", mbox = "hostmaster.example.com" }
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.server.listen_address(), "127.0.0.1:5353");
    assert_eq!(config.dns.default_ttl, 300);
    assert_eq!(config.dns.forwarders.len(), 2);
    assert!(config.dns.forwarding_enabled());
    assert_eq!(config.store.records.len(), 2);
    assert_eq!(
        config.store.records[1].meta.get("ns").map(String::as_str),
        Some("ns1.example.com")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn bang_sentinel_disables_forwarding_and_validates() {
    let toml = r#"
        [dns]
        forwarders = ["!", "8.8.8.8:53"]
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert!(!config.dns.forwarding_enabled());
    assert!(config.validate().is_ok());
}

#[test]
fn invalid_forwarder_address_fails_validation() {
    let toml = r#"
        [dns]
        forwarders = ["not-an-address"]
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn unsupported_static_record_type_fails_validation() {
    let toml = r#"
        [[store.records]]
        name = "host.example.com"
        record_type = "SSHFP"
        value = "whatever"
    "#;
    let config: Config = toml::from_str(toml).unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn cli_overrides_take_precedence() {
    let config = Config::load(
        None,
        CliOverrides {
            dns_port: Some(1053),
            bind_address: Some("127.0.0.1".to_string()),
            log_level: Some("trace".to_string()),
        },
    )
    .unwrap();
    assert_eq!(config.server.dns_port, 1053);
    assert_eq!(config.server.bind_address, "127.0.0.1");
    assert_eq!(config.logging.level, "trace");
}
