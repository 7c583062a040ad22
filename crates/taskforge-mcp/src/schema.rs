//! Static parameter tables for every tool in the catalog.
//!
//! The tables are the single source of truth for input shape: the generic
//! JSON-Schema emitter renders them for `tools/list`, and the coercion
//! routine validates raw arguments against them before a handler runs.

use serde_json::{json, Map, Value};

/// Wire-level kind of a single tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Accepts a JSON integer or a numeric-looking string.
    Number,
    /// Accepts a JSON string.
    Text,
    /// Accepts a JSON string, upper-cased during coercion. Membership in
    /// the allowed status set is the handler's concern.
    Status,
}

impl ParamKind {
    #[must_use]
    pub fn json_type(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::Text | Self::Status => "string",
        }
    }
}

/// Declaration of one tool parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub help: &'static str,
}

/// Parameter table for one tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolSchema {
    pub tool: &'static str,
    pub params: &'static [ParamSpec],
}

const fn required(name: &'static str, kind: ParamKind, help: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: true,
        help,
    }
}

const fn optional(name: &'static str, kind: ParamKind, help: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        kind,
        required: false,
        help,
    }
}

/// Parameter tables for the whole catalog, in registration order.
pub const SCHEMAS: &[ToolSchema] = &[
    ToolSchema {
        tool: "listProjects",
        params: &[],
    },
    ToolSchema {
        tool: "getProject",
        params: &[required("id", ParamKind::Number, "Project ID")],
    },
    ToolSchema {
        tool: "createProject",
        params: &[
            required("name", ParamKind::Text, "Project name"),
            optional("description", ParamKind::Text, "Project description"),
        ],
    },
    ToolSchema {
        tool: "updateProject",
        params: &[
            required("id", ParamKind::Number, "Project ID"),
            required("name", ParamKind::Text, "New project name"),
            optional("description", ParamKind::Text, "New project description"),
        ],
    },
    ToolSchema {
        tool: "deleteProject",
        params: &[required("id", ParamKind::Number, "Project ID to delete")],
    },
    ToolSchema {
        tool: "listTasks",
        params: &[required("projectId", ParamKind::Number, "Project ID")],
    },
    ToolSchema {
        tool: "getTask",
        params: &[required("id", ParamKind::Number, "Task ID")],
    },
    ToolSchema {
        tool: "createTask",
        params: &[
            required("projectId", ParamKind::Number, "Project ID"),
            required("title", ParamKind::Text, "Task title"),
            optional("description", ParamKind::Text, "Task description"),
            optional(
                "status",
                ParamKind::Status,
                "Task status (TODO, IN_PROGRESS, DONE)",
            ),
        ],
    },
    ToolSchema {
        tool: "updateTask",
        params: &[
            required("id", ParamKind::Number, "Task ID"),
            required("title", ParamKind::Text, "New task title"),
            optional("description", ParamKind::Text, "New task description"),
            optional("status", ParamKind::Status, "New task status"),
        ],
    },
    ToolSchema {
        tool: "deleteTask",
        params: &[required("id", ParamKind::Number, "Task ID to delete")],
    },
    ToolSchema {
        tool: "searchTasksByStatus",
        params: &[required(
            "status",
            ParamKind::Status,
            "Status to search for (TODO, IN_PROGRESS, DONE)",
        )],
    },
];

/// Look up the parameter table for a tool.
#[must_use]
pub fn lookup(tool: &str) -> Option<&'static ToolSchema> {
    SCHEMAS.iter().find(|s| s.tool == tool)
}

/// Render a parameter table as a JSON Schema object for discovery.
#[must_use]
pub fn input_schema(schema: &ToolSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in schema.params {
        properties.insert(
            param.name.to_string(),
            json!({
                "type": param.kind.json_type(),
                "description": param.help,
            }),
        );
        if param.required {
            required.push(Value::String(param.name.to_string()));
        }
    }

    let mut out = Map::new();
    out.insert("type".to_string(), Value::String("object".to_string()));
    out.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        out.insert("required".to_string(), Value::Array(required));
    }
    Value::Object(out)
}
