//! Table-driven coercion of raw JSON arguments into typed tool arguments.
//!
//! Coercion enforces shape only. Domain validity (status set membership,
//! entity existence) and defaulting are handler concerns.

use std::collections::BTreeMap;

use serde_json::Value;

use taskforge_core::Error;

use crate::schema::{ParamKind, ToolSchema};

/// A single coerced argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Number(i64),
    Text(String),
}

/// Typed argument map produced by [`coerce`]. Keys come from the schema
/// table, so only declared parameters ever appear here.
#[derive(Debug, Default, Clone)]
pub struct ToolArgs {
    values: BTreeMap<&'static str, ArgValue>,
}

impl ToolArgs {
    #[must_use]
    pub fn number(&self, name: &str) -> Option<i64> {
        match self.values.get(name) {
            Some(ArgValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Fetch a numeric argument that coercion guarantees to be present.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the argument is missing, which means the
    /// schema table and the handler disagree about the parameter name.
    pub fn require_number(&self, name: &str) -> Result<i64, Error> {
        self.number(name)
            .ok_or_else(|| Error::Internal(format!("coerced argument '{name}' missing")))
    }

    /// Fetch a text argument that coercion guarantees to be present.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the argument is missing, which means the
    /// schema table and the handler disagree about the parameter name.
    pub fn require_text(&self, name: &str) -> Result<&str, Error> {
        self.text(name)
            .ok_or_else(|| Error::Internal(format!("coerced argument '{name}' missing")))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Shape mismatch between raw arguments and a tool's parameter table.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct CoerceError(pub String);

/// Validate and convert a raw argument object against a parameter table.
///
/// JSON null and absent are both treated as "absent". Undeclared fields are
/// ignored. No defaults are applied.
///
/// # Errors
///
/// Returns [`CoerceError`] when a required parameter is absent, a value has
/// the wrong shape for its declared kind, or `raw` is not an object.
pub fn coerce(schema: &ToolSchema, raw: Option<&Value>) -> Result<ToolArgs, CoerceError> {
    static EMPTY: Value = Value::Null;
    let raw = raw.unwrap_or(&EMPTY);

    let fields = match raw {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            return Err(CoerceError(format!(
                "arguments must be an object, got {}",
                json_kind(other)
            )))
        }
    };

    let mut args = ToolArgs::default();

    for param in schema.params {
        let value = fields.and_then(|m| m.get(param.name));
        let value = match value {
            None | Some(Value::Null) => {
                if param.required {
                    return Err(CoerceError(format!(
                        "missing required parameter '{}'",
                        param.name
                    )));
                }
                continue;
            }
            Some(v) => v,
        };

        let coerced = match param.kind {
            ParamKind::Number => coerce_number(param.name, value)?,
            ParamKind::Text => coerce_text(param.name, value)?,
            ParamKind::Status => match coerce_text(param.name, value)? {
                ArgValue::Text(s) => ArgValue::Text(s.to_uppercase()),
                other => other,
            },
        };
        args.values.insert(param.name, coerced);
    }

    Ok(args)
}

fn coerce_number(name: &str, value: &Value) -> Result<ArgValue, CoerceError> {
    match value {
        Value::Number(n) => n.as_i64().map(ArgValue::Number).ok_or_else(|| {
            CoerceError(format!("parameter '{name}' must be an integer, got {n}"))
        }),
        Value::String(s) => s.trim().parse::<i64>().map(ArgValue::Number).map_err(|_| {
            CoerceError(format!("parameter '{name}' must be numeric, got '{s}'"))
        }),
        other => Err(CoerceError(format!(
            "parameter '{name}' must be a number, got {}",
            json_kind(other)
        ))),
    }
}

fn coerce_text(name: &str, value: &Value) -> Result<ArgValue, CoerceError> {
    match value {
        Value::String(s) => Ok(ArgValue::Text(s.clone())),
        other => Err(CoerceError(format!(
            "parameter '{name}' must be a string, got {}",
            json_kind(other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
