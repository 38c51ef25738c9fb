#![allow(clippy::unwrap_used)]
// Integration tests for `RelayClient` using wiremock.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use statusmail_api::{Error, MailMessage, RelayClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RelayClient) {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/v1/messages", server.uri())).unwrap();
    let client = RelayClient::with_client(reqwest::Client::new(), endpoint);
    (server, client)
}

fn sample_message() -> MailMessage {
    let mut headers = BTreeMap::new();
    headers.insert("X-Incident-Status".to_owned(), "RED".to_owned());
    MailMessage {
        from: "\"Incident Management System\" <ops@example.com>".into(),
        to: vec!["oncall@example.com".into()],
        subject: "RED S1 Outage Communication | Checkout down".into(),
        headers,
        html: "<p>body</p>".into(),
    }
}

// ── Delivery tests ──────────────────────────────────────────────────

#[tokio::test]
async fn test_send_posts_message_json() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(body_json(json!({
            "from": "\"Incident Management System\" <ops@example.com>",
            "to": ["oncall@example.com"],
            "subject": "RED S1 Outage Communication | Checkout down",
            "headers": { "X-Incident-Status": "RED" },
            "html": "<p>body</p>"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg-42" })))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client.send(&sample_message()).await.unwrap();
    assert_eq!(receipt.id.as_deref(), Some("msg-42"));
}

#[tokio::test]
async fn test_send_accepts_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(202))
        .mount(&server)
        .await;

    let receipt = client.send(&sample_message()).await.unwrap();
    assert_eq!(receipt.id, None);
}

#[tokio::test]
async fn test_send_with_api_key_sets_bearer_header() {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/v1/messages", server.uri())).unwrap();
    let key: secrecy::SecretString = "relay-secret".to_string().into();
    let client = RelayClient::new(endpoint, Some(&key), &TransportConfig::default()).unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("authorization", "Bearer relay-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    client.send(&sample_message()).await.unwrap();
}

// ── Error mapping tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
        .mount(&server)
        .await;

    let result = client.send(&sample_message()).await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .mount(&server)
        .await;

    let err = client.send(&sample_message()).await.unwrap_err();
    assert!(
        matches!(err, Error::RateLimited { retry_after_secs: 7 }),
        "expected RateLimited(7), got: {err:?}"
    );
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_server_error_is_rejected_and_transient() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("relay overloaded"))
        .mount(&server)
        .await;

    let err = client.send(&sample_message()).await.unwrap_err();
    match &err {
        Error::Rejected { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "relay overloaded");
        }
        other => panic!("expected Rejected, got: {other:?}"),
    }
    assert!(err.is_transient());
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_bad_request_is_not_transient() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(422).set_body_string("missing to"))
        .mount(&server)
        .await;

    let err = client.send(&sample_message()).await.unwrap_err();
    assert!(matches!(err, Error::Rejected { status: 422, .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_unparseable_success_body_is_still_delivered() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Queued"))
        .expect(1)
        .mount(&server)
        .await;

    let receipt = client.send(&sample_message()).await.unwrap();
    assert_eq!(receipt.id, None);
}

#[tokio::test]
async fn test_timeout_maps_to_timeout_error() {
    let server = MockServer::start().await;
    let endpoint = Url::parse(&format!("{}/v1/messages", server.uri())).unwrap();
    let transport = TransportConfig {
        timeout: Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let client = RelayClient::new(endpoint, None, &transport).unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let err = client.send(&sample_message()).await.unwrap_err();
    assert!(
        matches!(err, Error::Timeout { timeout_secs: 1 }),
        "expected Timeout, got: {err:?}"
    );
}

#[test]
fn test_header_lookup_ignores_case() {
    let message = sample_message();
    assert_eq!(message.header("x-incident-status"), Some("RED"));
    assert_eq!(message.header("X-Missing"), None);
}
