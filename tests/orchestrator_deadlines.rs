//! Deadline and failure classification over real sockets.

use std::time::{Duration, Instant};

use reqwest::StatusCode;
use spreedly_client::config::{ClientConfig, TimeoutConfig};
use spreedly_client::http::{ApiRequest, ReqwestTransport, Transport};
use spreedly_client::resilience::{call_with_deadlines, CallOutcome, CallPhase, Deadlines};
use spreedly_client::security::SecurityKeys;
use spreedly_client::{FailureReason, GatewayService};

mod common;
use common::MockReply;

const GATEWAYS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gateways>
  <gateway>
    <token>tok-test</token>
    <gateway_type>test</gateway_type>
    <enabled type="boolean">true</enabled>
  </gateway>
</gateways>"#;

fn config_for(base_url: &str) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.api.base_url = base_url.to_string();
    config.credentials.application_id = "app-id".to_string();
    config.credentials.master_key = "master-key".to_string();
    config.timeouts = TimeoutConfig {
        call_ms: 300,
        read_ms: 150,
        probe_secs: 1,
    };
    config
}

fn transport_for(base_url: &str) -> ReqwestTransport {
    let config = config_for(base_url);
    let keys = SecurityKeys::from_config(&config.credentials);
    ReqwestTransport::new(&config.api, &config.tls, keys.api_auth()).unwrap()
}

fn deadlines() -> Deadlines {
    Deadlines {
        call: Duration::from_millis(300),
        read: Duration::from_millis(150),
    }
}

#[tokio::test]
async fn test_ping_sends_authenticated_listing() {
    let server = common::start_mock_backend(MockReply::ok(GATEWAYS)).await;
    let service = GatewayService::from_config(&config_for(&server.base_url())).unwrap();

    assert_eq!(service.ping().await, Ok(()));

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/v1/gateways.xml");
    // base64("app-id:master-key")
    assert_eq!(
        requests[0].header("authorization"),
        Some("Basic YXBwLWlkOm1hc3Rlci1rZXk=")
    );
}

#[tokio::test]
async fn test_slow_headers_hit_call_deadline() {
    let server = common::start_mock_backend(
        MockReply::ok(GATEWAYS).delayed_headers(Duration::from_secs(3)),
    )
    .await;
    let transport = transport_for(&server.base_url());

    let started = Instant::now();
    let outcome = call_with_deadlines(deadlines(), |cancel| {
        transport.send(ApiRequest::list_gateways(), cancel)
    })
    .await;

    assert!(matches!(outcome, CallOutcome::Timeout(CallPhase::Exchange)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_stalled_body_hits_read_deadline() {
    let server = common::start_mock_backend(
        MockReply::ok(GATEWAYS).stalled_body(Duration::from_secs(3)),
    )
    .await;
    let transport = transport_for(&server.base_url());

    let started = Instant::now();
    let outcome = call_with_deadlines(deadlines(), |cancel| {
        transport.send(ApiRequest::list_gateways(), cancel)
    })
    .await;

    assert!(matches!(outcome, CallOutcome::Timeout(CallPhase::Read)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_refused_connection() {
    let addr = common::unused_addr().await;
    let service = GatewayService::from_config(&config_for(&format!("http://{}", addr))).unwrap();

    assert_eq!(service.ping().await, Err(FailureReason::ConnectionFailure));
    assert!(service.gateways().await.is_none());
}

#[tokio::test]
async fn test_failure_status_with_xml_body() {
    let body = r#"<errors><error key="errors.gateway_not_found">Unable to find the specified gateway.</error></errors>"#;
    let server = common::start_mock_backend(MockReply::status(404, body)).await;
    let transport = transport_for(&server.base_url());

    let outcome = call_with_deadlines(deadlines(), |cancel| {
        transport.send(ApiRequest::redact_gateway("missing"), cancel)
    })
    .await;

    match outcome {
        CallOutcome::HttpFailure { status, document } => {
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(document.root().name, "errors");
        }
        other => panic!("expected http failure, got {:?}", other),
    }

    let service = GatewayService::from_config(&config_for(&server.base_url())).unwrap();
    assert!(service.redact_gateway("missing").await.is_none());
    assert!(service.redacted_token().is_none());

    let last = server.requests().pop().unwrap();
    assert_eq!(last.method, "PUT");
    assert_eq!(last.path, "/v1/gateways/missing/redact.xml");
}

#[tokio::test]
async fn test_tokens_are_encoded_into_one_segment() {
    let server = common::start_mock_backend(MockReply::status(404, "<errors/>")).await;
    let service = GatewayService::from_config(&config_for(&server.base_url())).unwrap();

    assert!(service
        .redact_gateway("../payment_methods/pm-1/retain.xml?x=")
        .await
        .is_none());
    assert!(service.redact_gateway("tok#frag").await.is_none());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert!(request.path.starts_with("/v1/gateways/"));
        assert!(request.path.ends_with("/redact.xml"));
        assert!(!request.path.contains('?'));
        assert_eq!(request.path.matches('/').count(), 4);
    }
    assert_eq!(requests[1].path, "/v1/gateways/tok%23frag/redact.xml");
}

#[tokio::test]
async fn test_malformed_body() {
    let server = common::start_mock_backend(MockReply::ok("<gateways><gateway>")).await;
    let transport = transport_for(&server.base_url());

    let outcome = call_with_deadlines(deadlines(), |cancel| {
        transport.send(ApiRequest::list_gateways(), cancel)
    })
    .await;

    assert!(matches!(
        outcome,
        CallOutcome::MalformedResponse { status, .. } if status == StatusCode::OK
    ));
    assert_eq!(
        outcome.failure_reason(),
        Some(FailureReason::MalformedResponse)
    );
}

#[tokio::test]
async fn test_gateway_exists_over_socket() {
    let server = common::start_programmable_backend(|request| async move {
        if request.path.ends_with("/known.xml") {
            MockReply::ok("<gateway><token>known</token></gateway>")
        } else if request.path.ends_with("/slow.xml") {
            MockReply::ok("<gateway/>").delayed_headers(Duration::from_secs(3))
        } else {
            MockReply::status(404, "<errors/>")
        }
    })
    .await;
    let service = GatewayService::from_config(&config_for(&server.base_url()))
        .unwrap()
        .with_deadlines(deadlines(), Duration::from_millis(300));

    assert!(service.gateway_exists("known").await);
    assert!(!service.gateway_exists("unknown").await);

    let started = Instant::now();
    assert!(!service.gateway_exists("slow").await);
    assert!(started.elapsed() < Duration::from_secs(2));
}
