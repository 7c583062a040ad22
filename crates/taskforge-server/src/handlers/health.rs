use axum::{extract::State, Json};
use serde_json::Value;

use crate::app_state::AppState;

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.session_count(),
    }))
}
