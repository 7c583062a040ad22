//! Read-only resource catalog mapping `task://` URIs onto catalog tools.

use serde_json::{json, Value};

use crate::dispatch::DispatchError;

/// Which underlying query a resource URI resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceQuery {
    Projects,
    TasksByStatus(String),
}

/// Catalog listing for `resources/list`.
#[must_use]
pub fn list() -> Value {
    json!({
        "resources": [
            {
                "uri": "task://projects",
                "name": "All Projects",
                "description": "List of all projects in the system",
                "mimeType": "application/json"
            },
            {
                "uri": "task://tasks/todo",
                "name": "TODO Tasks",
                "description": "All tasks with TODO status",
                "mimeType": "application/json"
            },
            {
                "uri": "task://tasks/in_progress",
                "name": "In Progress Tasks",
                "description": "All tasks currently in progress",
                "mimeType": "application/json"
            },
            {
                "uri": "task://tasks/done",
                "name": "Completed Tasks",
                "description": "All completed tasks",
                "mimeType": "application/json"
            }
        ]
    })
}

/// Resolve a resource URI.
///
/// # Errors
///
/// Returns invalid-params for URIs outside the `task://` namespace.
pub fn parse_uri(uri: &str) -> Result<ResourceQuery, DispatchError> {
    if uri == "task://projects" {
        return Ok(ResourceQuery::Projects);
    }
    if let Some(status) = uri.strip_prefix("task://tasks/") {
        return Ok(ResourceQuery::TasksByStatus(status.to_uppercase()));
    }
    Err(DispatchError::InvalidParams(format!(
        "unknown resource URI: {uri}"
    )))
}
