use axum::{extract::State, Json};
use serde_json::Value;

use taskforge_mcp::jsonrpc::PARSE_ERROR;
use taskforge_mcp::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};

use crate::app_state::AppState;

/// Single-shot request/response binding: one inbound message, one dispatch,
/// one outbound envelope. Stateless, no session.
///
/// The body is parsed by hand so malformed JSON gets the same error envelope
/// as everything else, with a null id since the original cannot be recovered.
pub async fn rpc(State(state): State<AppState>, body: String) -> Json<JsonRpcResponse> {
    match serde_json::from_str::<JsonRpcRequest>(&body) {
        Ok(request) => Json(state.dispatcher.dispatch(&request).await),
        Err(e) => Json(JsonRpcResponse::error(
            Value::Null,
            PARSE_ERROR,
            format!("parse error: {e}"),
        )),
    }
}

/// Static server info so clients probing with GET don't get a 405.
pub async fn rpc_info() -> Json<Value> {
    Json(serde_json::json!({
        "serverInfo": {
            "name": "taskforge",
            "protocol": "mcp",
            "protocolVersion": PROTOCOL_VERSION,
        },
        "endpoints": {
            "rpc": "/mcp/rpc",
            "events": "/mcp/sse",
            "socket": "/mcp/ws",
        }
    }))
}
