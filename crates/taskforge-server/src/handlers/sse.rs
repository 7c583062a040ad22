use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tokio_stream::wrappers::UnboundedReceiverStream;

use taskforge_mcp::jsonrpc::PARSE_ERROR;
use taskforge_mcp::{JsonRpcRequest, JsonRpcResponse};

use crate::app_state::AppState;
use crate::session::{Session, SessionEvent, SessionGuard, SessionManager};

const MESSAGE_ENDPOINT: &str = "/mcp/sse/message";

/// One server-sent event before it is rendered onto the wire.
#[derive(Debug, Clone)]
pub(crate) struct SseFrame {
    pub name: &'static str,
    pub data: Value,
}

impl SseFrame {
    fn into_event(self) -> Event {
        Event::default()
            .event(self.name)
            .json_data(&self.data)
            .unwrap_or_else(|_| Event::default().event(self.name).data("serialization error"))
    }
}

impl From<SessionEvent> for SseFrame {
    fn from(event: SessionEvent) -> Self {
        match event {
            SessionEvent::Response(data) => Self {
                name: "message",
                data,
            },
            SessionEvent::Ping(data) => Self { name: "ping", data },
        }
    }
}

/// Allocate a streaming session and build its outbound frame sequence: the
/// endpoint descriptor first, then dispatch results and heartbeats as they
/// come. Dropping the stream tears the session down.
pub(crate) fn open_event_stream(
    sessions: &SessionManager,
) -> (Arc<Session>, impl Stream<Item = SseFrame>) {
    let (session, rx) = sessions.open(true);

    let endpoint = SseFrame {
        name: "endpoint",
        data: serde_json::json!({
            "endpoint": format!("{MESSAGE_ENDPOINT}?session={}", session.id),
            "capabilities": { "acceptsStreamingMessages": true },
        }),
    };

    let guard = SessionGuard::new(sessions.clone(), session.id.clone());
    let frames = stream::once(std::future::ready(endpoint))
        .chain(UnboundedReceiverStream::new(rx).map(SseFrame::from))
        .map(move |frame| {
            let _hold = &guard;
            frame
        });

    (session, frames)
}

/// Event-stream transport: GET opens the stream, the companion POST endpoint
/// feeds it requests.
pub async fn mcp_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (session, frames) = open_event_stream(&state.sessions);
    tracing::info!(session = %session.id, "event stream connected");

    Sse::new(frames.map(|frame| Ok(frame.into_event())))
}

#[derive(serde::Deserialize)]
pub struct SessionQuery {
    session: String,
}

/// Inbound half of the event-stream transport. The response envelope is
/// pushed onto the session's stream; the POST itself only acknowledges.
pub async fn sse_message(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
    body: String,
) -> impl IntoResponse {
    let Some(session) = state.sessions.get(&query.session) else {
        return (
            StatusCode::NOT_FOUND,
            format!("unknown session: {}", query.session),
        );
    };
    session.touch();

    let response = match serde_json::from_str::<JsonRpcRequest>(&body) {
        // Notifications expect no reply.
        Ok(request) if request.is_notification() => {
            tracing::debug!(session = %session.id, method = %request.method, "notification");
            return (StatusCode::ACCEPTED, String::new());
        }
        Ok(request) => state.dispatcher.dispatch(&request).await,
        Err(e) => JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {e}")),
    };

    let payload = serde_json::to_value(&response).unwrap_or_default();
    if !session.push(SessionEvent::Response(payload)) {
        // Write failure: the receiving side is gone, tear down.
        state.sessions.close(&session.id);
    }

    (StatusCode::ACCEPTED, String::new())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(Duration::from_secs(30))
    }

    #[tokio::test]
    async fn first_frame_is_the_endpoint_descriptor() {
        let sessions = manager();
        let (session, frames) = open_event_stream(&sessions);
        let mut frames = Box::pin(frames);

        let frame = frames.next().await.unwrap();
        assert_eq!(frame.name, "endpoint");

        let endpoint = frame.data["endpoint"].as_str().unwrap();
        assert!(endpoint.contains(&session.id));
        assert_eq!(frame.data["capabilities"]["acceptsStreamingMessages"], true);
    }

    #[tokio::test]
    async fn pushed_responses_arrive_as_message_frames() {
        let sessions = manager();
        let (session, frames) = open_event_stream(&sessions);
        let mut frames = Box::pin(frames);

        // Skip the endpoint descriptor.
        frames.next().await.unwrap();

        session.push(SessionEvent::Response(serde_json::json!({"id": 1})));
        let frame = frames.next().await.unwrap();
        assert_eq!(frame.name, "message");
        assert_eq!(frame.data["id"], 1);
    }

    #[tokio::test(start_paused = true)]
    async fn heartbeat_frame_follows_after_the_interval() {
        let sessions = manager();
        let (_session, frames) = open_event_stream(&sessions);
        let mut frames = Box::pin(frames);

        let started = tokio::time::Instant::now();
        frames.next().await.unwrap();

        let frame = frames.next().await.unwrap();
        assert_eq!(frame.name, "ping");
        assert_eq!(frame.data["method"], "ping");
        assert!(started.elapsed() >= Duration::from_secs(30));
    }

    #[tokio::test]
    async fn dropping_the_stream_tears_the_session_down() {
        let sessions = manager();
        let (session, frames) = open_event_stream(&sessions);
        assert!(sessions.is_open(&session.id));

        drop(frames);
        assert!(!sessions.is_open(&session.id));
    }
}
