//! The unified method dispatcher.
//!
//! One resolution path for every transport: built-in protocol methods first,
//! then the tool registry, either through the `tools/call` envelope or by
//! naming the tool directly as the method.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{json, Value};

use taskforge_core::Error;

use crate::coerce;
use crate::jsonrpc::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
};
use crate::registry::ToolRegistry;
use crate::resources::ResourceQuery;
use crate::{prompts, resources};

/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "taskforge";

/// Dispatch failure, carrying its reserved JSON-RPC code.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown method: {0}")]
    UnknownMethod(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid params: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    Handler(#[from] Error),
}

impl DispatchError {
    #[must_use]
    pub fn code(&self) -> i32 {
        match self {
            Self::UnknownMethod(_) => METHOD_NOT_FOUND,
            Self::UnknownTool(_) | Self::InvalidParams(_) => INVALID_PARAMS,
            Self::Handler(_) => INTERNAL_ERROR,
        }
    }
}

/// Resolves method names and invokes handlers. Holds no mutable state, so a
/// single instance serves arbitrarily many concurrent callers.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    started_wall_ms: i64,
    started: Instant,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self {
            registry,
            started_wall_ms: chrono::Utc::now().timestamp_millis(),
            started: Instant::now(),
        }
    }

    /// Dispatch a parsed request and build the full response envelope.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> JsonRpcResponse {
        tracing::debug!(method = %request.method, "dispatching");
        match self.run(&request.method, request.params.as_ref()).await {
            Ok(result) => JsonRpcResponse::success(request.id.clone(), result),
            Err(err) => {
                tracing::debug!(method = %request.method, error = %err, "dispatch failed");
                JsonRpcResponse::error(request.id.clone(), err.code(), err.to_string())
            }
        }
    }

    /// Resolve and invoke a method, returning the bare result value.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] for unknown methods, shape mismatches and
    /// handler failures; no failure escapes as a panic.
    pub async fn run(
        &self,
        method: &str,
        params: Option<&Value>,
    ) -> Result<Value, DispatchError> {
        match method {
            "initialize" => Ok(self.initialize_result()),
            "notifications/initialized" => Ok(json!({ "serverInfo": server_info() })),
            "ping" => Ok(json!({ "pong": true, "timestamp": self.timestamp_ms() })),
            "tools/list" => Ok(json!({ "tools": self.registry.descriptors() })),
            "tools/call" => self.tools_call(params).await,
            "prompts/list" => Ok(prompts::list()),
            "prompts/get" => prompts::get(params),
            "resources/list" => Ok(resources::list()),
            "resources/read" => self.resources_read(params).await,
            // Everything else resolves directly against the registry.
            other => match self.invoke(other, params).await {
                Err(DispatchError::UnknownTool(_)) => {
                    Err(DispatchError::UnknownMethod(other.to_string()))
                }
                result => result,
            },
        }
    }

    /// Look up a tool, coerce its arguments and invoke the handler inline.
    async fn invoke(&self, tool: &str, raw: Option<&Value>) -> Result<Value, DispatchError> {
        let definition = self
            .registry
            .lookup(tool)
            .ok_or_else(|| DispatchError::UnknownTool(tool.to_string()))?;

        let args = coerce::coerce(definition.schema, raw)
            .map_err(|e| DispatchError::InvalidParams(e.to_string()))?;

        (definition.handler)(args).await.map_err(|e| {
            tracing::warn!(tool, error = %e, "tool handler failed");
            DispatchError::Handler(e)
        })
    }

    async fn tools_call(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let params = params
            .ok_or_else(|| DispatchError::InvalidParams("missing params".to_string()))?;
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| DispatchError::InvalidParams("missing tool name".to_string()))?;
        let arguments = params.get("arguments");

        match self.invoke(name, arguments).await {
            Ok(value) => Ok(call_envelope(
                serde_json::to_string_pretty(&value).unwrap_or_default(),
                false,
            )),
            // Tool-execution failures ride inside the envelope; protocol
            // failures stay coded errors.
            Err(DispatchError::Handler(e)) => Ok(call_envelope(format!("Error: {e}"), true)),
            Err(e) => Err(e),
        }
    }

    async fn resources_read(&self, params: Option<&Value>) -> Result<Value, DispatchError> {
        let uri = params
            .and_then(|p| p.get("uri"))
            .and_then(Value::as_str)
            .ok_or_else(|| DispatchError::InvalidParams("missing resource uri".to_string()))?;

        let contents = match resources::parse_uri(uri)? {
            ResourceQuery::Projects => self.invoke("listProjects", None).await?,
            ResourceQuery::TasksByStatus(status) => {
                let args = json!({ "status": status });
                self.invoke("searchTasksByStatus", Some(&args)).await?
            }
        };

        Ok(json!({
            "contents": [{
                "uri": uri,
                "mimeType": "application/json",
                "text": serde_json::to_string(&contents).unwrap_or_default(),
            }]
        }))
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": server_info(),
            "capabilities": {
                "tools": { "listChanged": false },
                "resources": { "subscribe": false, "listChanged": false },
                "prompts": { "listChanged": false },
                "logging": {}
            }
        })
    }

    /// Milliseconds since the Unix epoch, anchored to the monotonic clock so
    /// repeated reads never decrease within one process lifetime.
    fn timestamp_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.started.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.started_wall_ms.saturating_add(elapsed)
    }
}

fn server_info() -> Value {
    json!({ "name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION") })
}

fn call_envelope(text: String, is_error: bool) -> Value {
    json!({
        "content": [{ "type": "text", "text": text }],
        "isError": is_error,
    })
}
