//! Tool registry: the immutable-after-build catalog of named operations.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::{json, Value};

use taskforge_core::Error;

use crate::coerce::ToolArgs;
use crate::schema::{self, ToolSchema};

/// Handler invoked with coerced arguments, awaited inline by the dispatcher.
pub type ToolHandler =
    Arc<dyn Fn(ToolArgs) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync>;

/// Definition of a tool exposed through discovery and dispatch.
#[derive(Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub schema: &'static ToolSchema,
    pub handler: ToolHandler,
}

impl ToolDefinition {
    /// Build a definition, resolving the parameter table for `name`.
    ///
    /// # Errors
    ///
    /// Fails when no parameter table exists for the tool, which would leave
    /// discovery and coercion inconsistent with the handler.
    pub fn new<F>(name: &'static str, description: &str, handler: F) -> Result<Self, RegistryError>
    where
        F: Fn(ToolArgs) -> BoxFuture<'static, Result<Value, Error>> + Send + Sync + 'static,
    {
        let schema = schema::lookup(name)
            .ok_or_else(|| RegistryError::MissingSchema(name.to_string()))?;
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            schema,
            handler: Arc::new(handler),
        })
    }

    /// Discovery descriptor for `tools/list`.
    #[must_use]
    pub fn descriptor(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": schema::input_schema(self.schema),
        })
    }
}

impl std::fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Registration failure.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("tool already registered: {0}")]
    Duplicate(String),

    #[error("no parameter table for tool: {0}")]
    MissingSchema(String),
}

/// Insertion-ordered catalog mapping tool name to definition. Built once at
/// startup, then shared read-only.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique; the first registration wins.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Duplicate`] when the name is already taken,
    /// leaving the existing registration intact.
    pub fn register(&mut self, definition: ToolDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(&definition.name) {
            return Err(RegistryError::Duplicate(definition.name));
        }
        tracing::debug!(tool = %definition.name, "tool registered");
        self.index
            .insert(definition.name.clone(), self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    /// Look up a tool by exact, case-sensitive name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All definitions in registration order.
    #[must_use]
    pub fn list(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Discovery descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> Vec<Value> {
        self.tools.iter().map(ToolDefinition::descriptor).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
