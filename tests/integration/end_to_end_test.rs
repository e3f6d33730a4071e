//! End-to-end tests against local mock servers
//!
//! Runs workflows through the reqwest client to verify what actually goes
//! over the wire: substituted URLs, headers and bodies, and how statuses are
//! recorded.
#![cfg(feature = "native")]

use super::workflow_with;
use apex::executor::{ExecutionConfig, ReqwestClient};
use apex::models::{HttpMethod, RequestDefinition, SaveConfig};
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> ReqwestClient {
    let mut default_headers = HashMap::new();
    default_headers.insert("User-Agent".to_string(), "apex-e2e".to_string());

    ReqwestClient::new(&ExecutionConfig {
        timeout_ms: 5000,
        follow_redirects: true,
        max_redirects: 10,
        validate_ssl: true,
        default_headers,
    })
    .unwrap()
}

#[tokio::test]
async fn test_login_then_authorized_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"user": "ada"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"auth": {"token": "t-123"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("Authorization", "Bearer t-123"))
        .and(header("User-Agent", "apex-e2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "Ada"})))
        .expect(1)
        .mount(&server)
        .await;

    let wf = workflow_with(client());
    wf.submit(
        RequestDefinition::new(HttpMethod::POST, format!("{}/login", server.uri()))
            .with_arguments(r#"{"user": "ada"}"#),
    );
    wf.submit(
        RequestDefinition::new(HttpMethod::GET, format!("{}/me", server.uri()))
            .with_headers(r#"{"Authorization": "Bearer !token:no-quotes!"}"#),
    );

    wf.run_one(0).await.unwrap();
    wf.save_from_response(0, "auth/token", "token").unwrap();
    wf.run_one(1).await.unwrap();

    let responses = wf.responses();
    assert_eq!(responses[&1].status, 200);
    assert_eq!(responses[&1].data, Some(json!({"name": "Ada"})));
}

#[tokio::test]
async fn test_url_tokens_are_encoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "a b/c"))
        .respond_with(ResponseTemplate::new(200).set_body_string("found"))
        .mount(&server)
        .await;

    let wf = workflow_with(client());
    wf.submit(RequestDefinition::new(
        HttpMethod::GET,
        format!("{}/search?q=!q!", server.uri()),
    ));
    wf.save_manual("q", "a b/c").unwrap();

    let record = wf.run_one(0).await.unwrap().unwrap();
    assert_eq!(record.status, 200);
    assert_eq!(record.data, Some(json!("found")));
}

#[tokio::test]
async fn test_status_classes_are_recorded_differently() {
    let server = MockServer::start().await;

    Mock::given(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;
    Mock::given(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(path("/fine"))
        .respond_with(ResponseTemplate::new(200).insert_header("X-Trace", "abc"))
        .mount(&server)
        .await;

    let wf = workflow_with(client());
    for route in ["missing", "broken", "fine"] {
        wf.submit(RequestDefinition::new(
            HttpMethod::GET,
            format!("{}/{}", server.uri(), route),
        ));
    }

    wf.run_all().await;

    let responses = wf.responses();
    assert_eq!(responses[&0].status, 404);
    assert_eq!(responses[&0].status_text, "Not Found");
    assert!(responses[&0].data.is_none());
    assert!(!responses.contains_key(&1));
    assert_eq!(
        responses[&2].headers.as_ref().unwrap()["x-trace"],
        json!("abc")
    );
}

#[tokio::test]
async fn test_sequential_run_refreshes_captured_values() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "fresh"})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/session/fresh"))
        .and(body_json(json!({"session": "fresh"})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let wf = workflow_with(client());
    wf.submit(RequestDefinition::new(
        HttpMethod::POST,
        format!("{}/session", server.uri()),
    ));
    wf.submit(
        RequestDefinition::new(HttpMethod::PUT, format!("{}/session/!sid!", server.uri()))
            .with_arguments(r#"{"session": !sid!}"#),
    );
    wf.save_value(SaveConfig::from_response("sid", "id", json!("stale"), 0))
        .unwrap();

    wf.run_all().await;

    assert_eq!(wf.saved()["sid"].data, json!("fresh"));
    assert_eq!(wf.responses()[&1].status, 204);
}

#[tokio::test]
async fn test_connection_failure_leaves_slot_empty_and_run_continues() {
    let server = MockServer::start().await;
    Mock::given(path("/ok"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let wf = workflow_with(client());
    wf.submit(RequestDefinition::new(HttpMethod::GET, "http://127.0.0.1:9/"));
    wf.submit(RequestDefinition::new(
        HttpMethod::GET,
        format!("{}/ok", server.uri()),
    ));

    wf.run_all().await;

    let responses = wf.responses();
    assert!(!responses.contains_key(&0));
    assert_eq!(responses[&1].status, 200);
}
