//! Workflow file integration tests
//!
//! Load a workflow from disk, run it, and write the results back.

use super::{workflow_with, ScriptedClient};
use apex::executor::{RunConfig, Workflow};
use apex::models::Availability;
use apex::workflow::{self, FileError};
use serde_json::{json, Value};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const WORKFLOW: &str = r#"{
  "requests": [
    {"url": "https://api.test/items", "method": "post", "arguments": "{\"name\": \"box\"}", "headers": "", "identifier": "a"},
    {"url": "https://api.test/items/!itemId!", "method": "get", "arguments": "", "headers": "{\"X-Owner\": !owner!}", "identifier": "b"}
  ],
  "responses": {},
  "saved": {
    "itemId": {"data": 0, "key": "item/id", "availableFrom": 0},
    "owner": {"data": "ada", "key": "", "availableFrom": -1}
  }
}"#;

fn write_workflow(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("workflow.json");
    fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_load_run_save() {
    let dir = TempDir::new().unwrap();
    let path = write_workflow(&dir, WORKFLOW);

    let client = ScriptedClient::default()
        .route("https://api.test/items", 200, json!({"item": {"id": 9}}))
        .route("https://api.test/items/9", 200, json!({"name": "box"}));

    let state = workflow::load_path(&path).unwrap();
    let wf = Workflow::with_state(client, state, RunConfig::new(Duration::ZERO));
    wf.run_all().await;

    let calls = wf.client().calls();
    assert_eq!(calls[1].url, "https://api.test/items/9");
    assert_eq!(calls[1].header("X-Owner"), Some("ada"));

    let out = dir.path().join("out.json");
    workflow::save_path(&wf.snapshot(), &out).unwrap();

    let written: Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(written["saved"]["itemId"]["data"], json!(9));
    assert_eq!(written["saved"]["owner"]["availableFrom"], json!(-1));
    assert_eq!(written["responses"]["1"]["data"]["name"], json!("box"));
    assert_eq!(written["requests"][1]["identifier"], json!("b"));

    let reloaded = workflow::load_path(&out).unwrap();
    assert_eq!(reloaded.response(0).unwrap().status, 200);
    assert_eq!(
        reloaded.saved()["itemId"].available_from,
        Availability::AfterRequest(0)
    );
}

#[test]
fn test_rejected_file_leaves_workflow_untouched() {
    let wf = workflow_with(ScriptedClient::default());
    wf.load_str(WORKFLOW).unwrap();

    let mut broken: Value = serde_json::from_str(WORKFLOW).unwrap();
    broken.as_object_mut().unwrap().remove("responses");

    let result = wf.load_str(&broken.to_string());
    assert!(matches!(result, Err(FileError::Parse(_))));
    assert_eq!(wf.len(), 2);
    assert_eq!(wf.saved().len(), 2);
}

#[test]
fn test_response_keys_from_loaded_file() {
    let dir = TempDir::new().unwrap();
    let doc = json!({
        "requests": [{"url": "https://api.test", "method": "get", "arguments": "", "headers": "", "identifier": "x"}],
        "responses": {"0": {"status": 200, "statusText": "OK", "data": {"user": {"id": 1, "tags": ["a"]}}}},
        "saved": {}
    });
    let path = write_workflow(&dir, &doc.to_string());

    let state = workflow::load_path(&path).unwrap();
    assert_eq!(
        state.response_keys(0).unwrap(),
        vec!["user", "user/id", "user/tags", "user/tags/0"]
    );
}
