use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::app_state::AppState;
use crate::handlers;

/// Create the main application router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Single-shot request/response transport
        .route("/mcp/rpc", get(handlers::rpc_info).post(handlers::rpc))
        // Event-stream transport: GET opens the stream, POST feeds it
        .route("/mcp/sse", get(handlers::mcp_sse))
        .route("/mcp/sse/message", post(handlers::sse_message))
        // Duplex transport
        .route("/mcp/ws", get(handlers::mcp_ws))
        // Plain REST surface
        .route(
            "/api/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/api/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        .route(
            "/api/projects/{project_id}/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/api/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // CORS: allow any origin (MCP clients may run in various contexts)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
