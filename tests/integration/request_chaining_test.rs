//! Request chaining integration tests
//!
//! Values flow from one response into later requests through the public
//! workflow API, driven by a scripted client.

use super::{workflow_with, ScriptedClient};
use apex::models::{Availability, HttpMethod, RequestDefinition, SaveConfig};
use apex::variables::{compute_scope, substitute_body, substitute_url};
use apex::workflow::WorkflowError;
use serde_json::{json, Value};

fn get(url: &str) -> RequestDefinition {
    RequestDefinition::new(HttpMethod::GET, url)
}

#[tokio::test]
async fn test_sequential_dependency() {
    let wf = workflow_with(
        ScriptedClient::default()
            .route("https://api.test/login", 200, json!({"id": 42}))
            .route("https://api.test/profile", 200, json!({"name": "Ada"})),
    );
    wf.submit(RequestDefinition::new(HttpMethod::POST, "https://api.test/login"));
    wf.submit(
        RequestDefinition::new(HttpMethod::POST, "https://api.test/profile")
            .with_arguments(r#"{"user": !token!}"#),
    );

    wf.save_value(SaveConfig::from_response("token", "id", json!(0), 0))
        .unwrap();

    wf.run_from_onward(0).await;

    let calls = wf.client().calls();
    assert_eq!(calls.len(), 2);
    let body: Value = serde_json::from_str(calls[1].body.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({"user": 42}));
}

#[tokio::test]
async fn test_capture_then_run_next() {
    let wf = workflow_with(
        ScriptedClient::default()
            .route("https://httpbin.test/post", 200, json!({"url": "https://httpbin.test/post"}))
            .route("https://httpbin.test/get", 200, json!({})),
    );
    wf.submit(RequestDefinition::new(HttpMethod::POST, "https://httpbin.test/post"));
    wf.submit(get("!next:raw:post:get!"));

    wf.run_one(0).await.unwrap();
    wf.save_from_response(0, "url", "next").unwrap();
    wf.run_one(1).await.unwrap();

    let calls = wf.client().calls();
    assert_eq!(calls[1].url, "https://httpbin.test/get");
    assert_eq!(wf.responses()[&1].status, 200);
}

#[tokio::test]
async fn test_manual_value_used_everywhere() {
    let wf = workflow_with(
        ScriptedClient::default()
            .route("https://api.test/a%20b", 200, json!({}))
            .route("https://api.test/a b", 200, json!({})),
    );
    wf.submit(get("https://api.test/!x!"));
    wf.submit(get("https://api.test/!x:raw!"));
    wf.save_manual("x", "a b").unwrap();

    wf.run_all().await;

    let urls: Vec<String> = wf.client().calls().into_iter().map(|c| c.url).collect();
    assert_eq!(urls, vec!["https://api.test/a%20b", "https://api.test/a b"]);
    assert_eq!(wf.responses().len(), 2);
}

#[tokio::test]
async fn test_delete_reindexes_responses_and_saved_values() {
    let wf = workflow_with(
        ScriptedClient::default()
            .route("https://api.test/0", 200, json!({"v": 0}))
            .route("https://api.test/1", 200, json!({"v": 1}))
            .route("https://api.test/2", 200, json!({"v": 2})),
    );
    for i in 0..3 {
        wf.submit(get(&format!("https://api.test/{}", i)));
    }
    wf.run_all().await;
    wf.save_from_response(2, "v", "last").unwrap();

    wf.delete(1).unwrap();

    let responses = wf.responses();
    assert_eq!(responses.keys().copied().collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(responses[&1].data, Some(json!({"v": 2})));
    assert_eq!(
        wf.saved()["last"].available_from,
        Availability::AfterRequest(1)
    );
}

#[tokio::test]
async fn test_insert_after_then_run_keeps_correlation() {
    let wf = workflow_with(
        ScriptedClient::default()
            .route("https://api.test/first", 200, json!({"id": 7}))
            .route("https://api.test/last/7", 200, json!({}))
            .route("https://api.test/middle", 200, json!({})),
    );
    wf.submit(get("https://api.test/first"));
    wf.submit(get("https://api.test/last/!id!"));
    wf.run_one(0).await.unwrap();
    wf.save_from_response(0, "id", "id").unwrap();

    let inserted = wf.insert_after(0, get("https://api.test/middle")).unwrap();
    assert_eq!(inserted, 1);

    wf.run_from_onward(1).await;

    let requests = wf.requests();
    assert_eq!(requests[2].url, "https://api.test/last/!id!");
    assert_eq!(wf.responses().len(), 3);
    assert_eq!(wf.client().calls()[2].url, "https://api.test/last/7");
}

#[test]
fn test_name_uniqueness() {
    let wf = workflow_with(ScriptedClient::default());
    wf.save_manual("url", "https://first.test").unwrap();

    let second = wf.save_manual("url", "https://second.test");
    assert!(matches!(second, Err(WorkflowError::NameConflict(_))));
    assert!(second.unwrap_err().is_validation());
    assert_eq!(wf.saved()["url"].data, json!("https://first.test"));
}

#[test]
fn test_scope_strictness() {
    let mut saved = std::collections::BTreeMap::new();
    let (name, value) = SaveConfig::from_response("x", "id", json!(1), 1).into_entry();
    saved.insert(name, value);

    assert!(!compute_scope(&saved, 0).contains("x"));
    assert!(!compute_scope(&saved, 1).contains("x"));
    assert!(compute_scope(&saved, 2).contains("x"));
}

#[test]
fn test_token_round_trip_and_modifiers() {
    let mut saved = std::collections::BTreeMap::new();
    for config in [
        SaveConfig::manual("x", "hello"),
        SaveConfig::manual("path", "a b/c"),
        SaveConfig::manual("site", "https://example.com"),
    ] {
        let (name, value) = config.into_entry();
        saved.insert(name, value);
    }
    let scope = compute_scope(&saved, 0);

    let body = substitute_body(r#"{"greeting": !x!}"#, &scope).unwrap();
    let parsed: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed["greeting"], "hello");

    assert_eq!(substitute_url("!path!", &scope).unwrap(), "a%20b%2Fc");
    assert_eq!(substitute_url("!path:raw!", &scope).unwrap(), "a b/c");

    let rewritten = substitute_body(r#"{"site": !site:https:http!}"#, &scope).unwrap();
    assert_eq!(rewritten, r#"{"site": "http://example.com"}"#);
}
