use std::sync::Arc;
use std::time::Duration;

use axum_test::TestServer;
use serde_json::{json, Value};

use taskforge_core::traits::{ProjectStore, TaskStore};
use taskforge_mcp::catalog::build_registry;
use taskforge_mcp::Dispatcher;
use taskforge_server::app_state::AppState;
use taskforge_server::session::SessionManager;

mod mock_stores;
use mock_stores::MockStore;

fn build_test_app() -> TestServer {
    let store = Arc::new(MockStore::new());
    let projects: Arc<dyn ProjectStore> = store.clone();
    let tasks: Arc<dyn TaskStore> = store;

    let registry = build_registry(Arc::clone(&projects), Arc::clone(&tasks)).unwrap();

    let state = AppState {
        dispatcher: Arc::new(Dispatcher::new(Arc::new(registry))),
        sessions: SessionManager::new(Duration::from_secs(30)),
        projects,
        tasks,
    };

    let app = taskforge_server::router::create_router(state);
    TestServer::new(app).unwrap()
}

#[tokio::test]
async fn health_check() {
    let server = build_test_app();
    let resp = server.get("/health").await;
    resp.assert_status_ok();

    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn rpc_initialize() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {}
        }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["result"]["serverInfo"]["name"], "taskforge");
    assert_eq!(body["result"]["protocolVersion"], "2024-11-05");
}

#[tokio::test]
async fn rpc_tools_list() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/list",
            "params": {}
        }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    let tools = body["result"]["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 11);
}

#[tokio::test]
async fn rpc_unknown_method() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "nonexistent/method",
            "params": {}
        }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert!(body.get("error").is_some());
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn rpc_malformed_body_gets_parse_error_with_null_id() {
    let server = build_test_app();

    let resp = server.post("/mcp/rpc").text("this is not json").await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], -32700);
    assert!(body["id"].is_null());
}

#[tokio::test]
async fn rpc_direct_method_flow() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "createProject",
            "params": { "name": "Apollo" }
        }))
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    let project_id = body["result"]["id"].as_i64().unwrap();

    for id in 2..4 {
        let resp = server
            .post("/mcp/rpc")
            .json(&json!({
                "jsonrpc": "2.0",
                "id": id,
                "method": "createTask",
                "params": { "projectId": project_id, "title": "X" }
            }))
            .await;
        resp.assert_status_ok();
    }

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "listTasks",
            "params": { "projectId": project_id }
        }))
        .await;
    let body: Value = resp.json();
    assert_eq!(body["result"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn rpc_tools_call_envelope() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/rpc")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": "listProjects", "arguments": {} }
        }))
        .await;

    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["result"]["isError"], false);
    assert_eq!(body["result"]["content"][0]["type"], "text");
}

#[tokio::test]
async fn rpc_info_probe() {
    let server = build_test_app();

    let resp = server.get("/mcp/rpc").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["serverInfo"]["name"], "taskforge");
    assert_eq!(body["endpoints"]["rpc"], "/mcp/rpc");
}

#[tokio::test]
async fn sse_message_with_unknown_session_returns_404() {
    let server = build_test_app();

    let resp = server
        .post("/mcp/sse/message?session=no-such-session")
        .json(&json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "ping",
            "params": {}
        }))
        .await;

    resp.assert_status_not_found();
}

#[tokio::test]
async fn rest_project_crud() {
    let server = build_test_app();

    let resp = server
        .post("/api/projects")
        .json(&json!({ "name": "Apollo", "description": "moon shot" }))
        .await;
    resp.assert_status_ok();
    let created: Value = resp.json();
    let id = created["id"].as_i64().unwrap();

    let resp = server.get("/api/projects").await;
    resp.assert_status_ok();
    let listing: Value = resp.json();
    assert_eq!(listing.as_array().unwrap().len(), 1);

    let resp = server
        .put(&format!("/api/projects/{id}"))
        .json(&json!({ "name": "Artemis" }))
        .await;
    resp.assert_status_ok();
    let updated: Value = resp.json();
    assert_eq!(updated["name"], "Artemis");
    assert!(updated["description"].is_null());

    let resp = server.delete(&format!("/api/projects/{id}")).await;
    resp.assert_status(axum::http::StatusCode::NO_CONTENT);

    let resp = server.get(&format!("/api/projects/{id}")).await;
    resp.assert_status_not_found();
}

#[tokio::test]
async fn rest_task_flow() {
    let server = build_test_app();

    let resp = server
        .post("/api/projects")
        .json(&json!({ "name": "P" }))
        .await;
    let project: Value = resp.json();
    let project_id = project["id"].as_i64().unwrap();

    let resp = server
        .post(&format!("/api/projects/{project_id}/tasks"))
        .json(&json!({ "title": "first" }))
        .await;
    resp.assert_status_ok();
    let task: Value = resp.json();
    assert_eq!(task["status"], "TODO");
    let task_id = task["id"].as_i64().unwrap();

    let resp = server
        .put(&format!("/api/tasks/{task_id}"))
        .json(&json!({ "title": "first", "status": "DONE" }))
        .await;
    resp.assert_status_ok();
    let updated: Value = resp.json();
    assert_eq!(updated["status"], "DONE");

    let resp = server
        .get(&format!("/api/projects/{project_id}/tasks"))
        .await;
    let tasks: Value = resp.json();
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn rest_missing_task_returns_404() {
    let server = build_test_app();

    let resp = server.get("/api/tasks/999").await;
    resp.assert_status_not_found();

    let resp = server.delete("/api/tasks/999").await;
    resp.assert_status_not_found();
}

#[tokio::test]
async fn rest_create_task_in_missing_project_returns_404() {
    let server = build_test_app();

    let resp = server
        .post("/api/projects/42/tasks")
        .json(&json!({ "title": "orphan" }))
        .await;
    resp.assert_status_not_found();
}
