use async_trait::async_trait;

use crate::error::Error;
use crate::types::{
    CreateProject, CreateTask, Project, ProjectId, Task, TaskId, TaskStatus, UpdateProject,
    UpdateTask,
};

/// Store for managing projects.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// List all projects.
    async fn list(&self) -> Result<Vec<Project>, Error>;

    /// Get a project by ID.
    async fn get(&self, id: ProjectId) -> Result<Project, Error>;

    /// Create and persist a new project.
    async fn create(&self, params: CreateProject) -> Result<Project, Error>;

    /// Update a project's name and description.
    async fn update(&self, id: ProjectId, params: UpdateProject) -> Result<Project, Error>;

    /// Delete a project and its tasks.
    async fn delete(&self, id: ProjectId) -> Result<(), Error>;
}

/// Store for managing tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// List all tasks belonging to a project.
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>, Error>;

    /// Get a task by ID.
    async fn get(&self, id: TaskId) -> Result<Task, Error>;

    /// Create a new task inside a project.
    async fn create(&self, project_id: ProjectId, params: CreateTask) -> Result<Task, Error>;

    /// Update a task. Status is left unchanged when `params.status` is None.
    async fn update(&self, id: TaskId, params: UpdateTask) -> Result<Task, Error>;

    /// Delete a task.
    async fn delete(&self, id: TaskId) -> Result<(), Error>;

    /// List all tasks across projects with the given status.
    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, Error>;
}
