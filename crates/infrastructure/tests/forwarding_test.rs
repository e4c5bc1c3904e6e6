use hickory_proto::op::Message;
use keystone_dns_domain::{Question, RecordType};
use keystone_dns_infrastructure::dns::forwarding::{Forwarder, ForwarderClient, MessageBuilder};
use std::time::Duration;

#[test]
fn built_query_round_trips() {
    let question = Question::new("host.example.com", RecordType::AAAA);
    let bytes = MessageBuilder::build_query(&question).unwrap();

    let message = Message::from_vec(&bytes).unwrap();
    assert!(message.recursion_desired());
    assert_eq!(message.queries().len(), 1);
    let query = &message.queries()[0];
    assert_eq!(query.name().to_utf8(), "host.example.com.");
    assert_eq!(query.query_type(), hickory_proto::rr::RecordType::AAAA);
}

#[tokio::test]
async fn empty_upstream_list_answers_empty() {
    let client = ForwarderClient::new(vec![], Duration::from_millis(100));
    let answers = client
        .forward(&Question::new("foo.bar", RecordType::A))
        .await;
    assert!(answers.is_empty());
}

#[tokio::test]
async fn bang_sentinel_disables_forwarding_without_touching_the_network() {
    // The second entry is a blackhole address; if the sentinel were
    // ignored, this test would stall on the exchange instead of
    // returning instantly.
    let client = ForwarderClient::new(
        vec!["!".to_string(), "192.0.2.1:53".to_string()],
        Duration::from_secs(5),
    );

    let start = std::time::Instant::now();
    let answers = client
        .forward(&Question::new("foo.bar", RecordType::A))
        .await;

    assert!(answers.is_empty());
    assert!(
        start.elapsed() < Duration::from_millis(100),
        "sentinel must short-circuit before any exchange"
    );
}

#[tokio::test]
async fn unreachable_upstreams_are_exhausted_to_empty() {
    // TEST-NET addresses: exchanges time out, then exhaustion yields empty.
    let client = ForwarderClient::new(
        vec!["192.0.2.1:53".to_string(), "192.0.2.2:53".to_string()],
        Duration::from_millis(50),
    );

    let answers = client
        .forward(&Question::new("foo.bar", RecordType::A))
        .await;
    assert!(answers.is_empty());
}

#[tokio::test]
async fn unparseable_upstream_is_skipped() {
    let client = ForwarderClient::new(
        vec!["not-an-address".to_string()],
        Duration::from_millis(50),
    );
    let answers = client
        .forward(&Question::new("foo.bar", RecordType::A))
        .await;
    assert!(answers.is_empty());
}
