use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use serde_json::Value;

use taskforge_mcp::jsonrpc::INTERNAL_ERROR;
use taskforge_mcp::{Dispatcher, JsonRpcRequest, JsonRpcResponse};

use crate::app_state::AppState;

/// Duplex transport: every inbound frame is one request, answered on the
/// same socket. No proactive push; the client opens with an ordinary
/// handshake message.
pub async fn mcp_ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (session, _rx) = state.sessions.open(false);
    tracing::info!(session = %session.id, "duplex socket connected");

    let (mut sink, mut inbound) = socket.split();

    // Frames on one session are handled strictly in order: the response is
    // written back before the next frame is read. Distinct sessions run in
    // parallel on their own connection tasks.
    while let Some(Ok(message)) = inbound.next().await {
        match message {
            Message::Text(text) => {
                session.touch();
                let response = handle_frame(&state.dispatcher, text.as_str()).await;
                let payload = serde_json::to_string(&response).unwrap_or_default();
                if sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.sessions.close(&session.id);
    tracing::info!(session = %session.id, "duplex socket disconnected");
}

/// Parse and dispatch one frame. A frame that fails to parse answers with a
/// null id instead of closing the session; the original id is unrecoverable.
pub(crate) async fn handle_frame(dispatcher: &Dispatcher, raw: &str) -> JsonRpcResponse {
    match serde_json::from_str::<JsonRpcRequest>(raw) {
        Ok(request) => dispatcher.dispatch(&request).await,
        Err(e) => JsonRpcResponse::error(
            Value::Null,
            INTERNAL_ERROR,
            format!("malformed frame: {e}"),
        ),
    }
}
