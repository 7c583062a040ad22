//! The built-in tool catalog: project and task operations over the storage
//! facade, registered programmatically once at startup.

use std::sync::Arc;

use futures::FutureExt;
use serde_json::{json, Value};

use taskforge_core::traits::{ProjectStore, TaskStore};
use taskforge_core::types::{
    CreateProject, CreateTask, ProjectId, TaskId, TaskStatus, UpdateProject, UpdateTask,
};
use taskforge_core::Error;

use crate::coerce::ToolArgs;
use crate::registry::{RegistryError, ToolDefinition, ToolRegistry};

fn json_of<T: serde::Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|e| Error::Internal(e.to_string()))
}

/// Build the registry with the full project/task tool catalog.
///
/// # Errors
///
/// Fails if a tool is registered twice or lacks a parameter table; both mean
/// the catalog itself is inconsistent and the server should not start.
#[allow(clippy::too_many_lines)]
pub fn build_registry(
    projects: Arc<dyn ProjectStore>,
    tasks: Arc<dyn TaskStore>,
) -> Result<ToolRegistry, RegistryError> {
    let mut registry = ToolRegistry::new();

    let p = Arc::clone(&projects);
    registry.register(ToolDefinition::new(
        "listProjects",
        "List all projects in the system",
        move |_args: ToolArgs| {
            let p = Arc::clone(&p);
            async move { json_of(&p.list().await?) }.boxed()
        },
    )?)?;

    let p = Arc::clone(&projects);
    registry.register(ToolDefinition::new(
        "getProject",
        "Get details of a specific project by its ID",
        move |args: ToolArgs| {
            let p = Arc::clone(&p);
            async move {
                let id = ProjectId(args.require_number("id")?);
                json_of(&p.get(id).await?)
            }
            .boxed()
        },
    )?)?;

    let p = Arc::clone(&projects);
    registry.register(ToolDefinition::new(
        "createProject",
        "Create a new project with name and description",
        move |args: ToolArgs| {
            let p = Arc::clone(&p);
            async move {
                let params = CreateProject {
                    name: args.require_text("name")?.to_string(),
                    description: args.text("description").map(ToString::to_string),
                };
                json_of(&p.create(params).await?)
            }
            .boxed()
        },
    )?)?;

    let p = Arc::clone(&projects);
    registry.register(ToolDefinition::new(
        "updateProject",
        "Update an existing project's name and/or description",
        move |args: ToolArgs| {
            let p = Arc::clone(&p);
            async move {
                let id = ProjectId(args.require_number("id")?);
                let params = UpdateProject {
                    name: args.require_text("name")?.to_string(),
                    description: args.text("description").map(ToString::to_string),
                };
                json_of(&p.update(id, params).await?)
            }
            .boxed()
        },
    )?)?;

    let p = Arc::clone(&projects);
    registry.register(ToolDefinition::new(
        "deleteProject",
        "Delete a project by its ID",
        move |args: ToolArgs| {
            let p = Arc::clone(&p);
            async move {
                let id = args.require_number("id")?;
                p.delete(ProjectId(id)).await?;
                Ok(json!({ "deleted": id }))
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "listTasks",
        "List all tasks for a specific project",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let project_id = ProjectId(args.require_number("projectId")?);
                json_of(&t.list_by_project(project_id).await?)
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "getTask",
        "Get details of a specific task by its ID",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let id = TaskId(args.require_number("id")?);
                json_of(&t.get(id).await?)
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "createTask",
        "Create a new task in a project with title, description, and status",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let project_id = ProjectId(args.require_number("projectId")?);
                // Default applied here, after shape validation.
                let status = match args.text("status") {
                    Some(s) => TaskStatus::parse(s)?,
                    None => TaskStatus::Todo,
                };
                let params = CreateTask {
                    title: args.require_text("title")?.to_string(),
                    description: args.text("description").map(ToString::to_string),
                    status,
                };
                json_of(&t.create(project_id, params).await?)
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "updateTask",
        "Update an existing task's title, description, and/or status",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let id = TaskId(args.require_number("id")?);
                let status = args.text("status").map(TaskStatus::parse).transpose()?;
                let params = UpdateTask {
                    title: args.require_text("title")?.to_string(),
                    description: args.text("description").map(ToString::to_string),
                    status,
                };
                json_of(&t.update(id, params).await?)
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "deleteTask",
        "Delete a task by its ID",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let id = args.require_number("id")?;
                t.delete(TaskId(id)).await?;
                Ok(json!({ "deleted": id }))
            }
            .boxed()
        },
    )?)?;

    let t = Arc::clone(&tasks);
    registry.register(ToolDefinition::new(
        "searchTasksByStatus",
        "Search for tasks across all projects by their status (TODO, IN_PROGRESS, or DONE)",
        move |args: ToolArgs| {
            let t = Arc::clone(&t);
            async move {
                let status = TaskStatus::parse(args.require_text("status")?)?;
                json_of(&t.find_by_status(status).await?)
            }
            .boxed()
        },
    )?)?;

    Ok(registry)
}
