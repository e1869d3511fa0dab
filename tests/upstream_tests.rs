//! Tests for the upstream HTTP client: relay fidelity, action stamping and
//! transport failure mapping.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use onboarding_edge::error::GatewayError;
use onboarding_edge::upstream::UpstreamClient;

fn client(upstream_url: &str, timeout: Duration) -> UpstreamClient {
    UpstreamClient::new(upstream_url.parse().expect("upstream url"), timeout)
        .expect("upstream client")
}

#[tokio::test]
async fn test_forward_relays_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({ "ok": true, "id": "file-7" })),
        )
        .mount(&server)
        .await;

    let reply = client(&server.uri(), Duration::from_secs(2))
        .forward("listFiles", &json!({ "token": "t" }))
        .await
        .unwrap();
    assert_eq!(reply.status, 201);
    assert_eq!(reply.body, json!({ "ok": true, "id": "file-7" }));
    assert!(reply.is_ok_envelope());
}

#[tokio::test]
async fn test_forward_passes_error_envelopes_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "ok": false, "error": "no such file" })),
        )
        .mount(&server)
        .await;

    // An upstream error envelope is still a successful relay.
    let reply = client(&server.uri(), Duration::from_secs(2))
        .forward("deleteFile", &json!({ "name": "missing.pdf" }))
        .await
        .unwrap();
    assert_eq!(reply.status, 404);
    assert!(!reply.is_ok_envelope());
    assert_eq!(reply.body["error"], "no such file");
}

#[tokio::test]
async fn test_forward_stamps_action_over_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "action": "listLogs",
            "token": "t",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "logs": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server.uri(), Duration::from_secs(2))
        .forward("listLogs", &json!({ "action": "deleteFile", "token": "t" }))
        .await
        .unwrap();
    assert!(reply.is_ok_envelope());
}

#[tokio::test]
async fn test_forward_wraps_non_object_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_json(json!({ "action": "whoami" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let reply = client(&server.uri(), Duration::from_secs(2))
        .forward("whoami", &json!(null))
        .await
        .unwrap();
    assert!(reply.is_ok_envelope());
}

#[tokio::test]
async fn test_non_json_reply_maps_to_upstream_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let err = client(&server.uri(), Duration::from_secs(2))
        .forward("submitForm", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::UpstreamMalformed { status: 502 }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_slow_upstream_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": true }))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let err = client(&server.uri(), Duration::from_millis(200))
        .forward("listFiles", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Timeout { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_unreachable_upstream_maps_to_unavailable() {
    let err = client("http://127.0.0.1:1/", Duration::from_secs(1))
        .forward("listFiles", &json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::UpstreamUnavailable { .. }));
    assert!(err.is_retryable());
}
