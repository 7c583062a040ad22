use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use taskforge_core::types::{
    CreateProject, CreateTask, Project, ProjectId, Task, TaskId, TaskStatus, UpdateProject,
    UpdateTask,
};
use taskforge_core::Error;

use crate::app_state::AppState;

fn reject(error: Error) -> (StatusCode, String) {
    let status = if error.is_not_found() {
        StatusCode::NOT_FOUND
    } else if matches!(error, Error::Validation(_)) {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, error.to_string())
}

/// Request body for creating or updating a project.
#[derive(serde::Deserialize)]
pub struct ProjectBody {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for creating or updating a task.
#[derive(serde::Deserialize)]
pub struct TaskBody {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

#[allow(clippy::missing_errors_doc)]
pub async fn list_projects(
    State(state): State<AppState>,
) -> Result<Json<Vec<Project>>, (StatusCode, String)> {
    state.projects.list().await.map(Json).map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .projects
        .get(ProjectId(id))
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn create_project(
    State(state): State<AppState>,
    Json(body): Json<ProjectBody>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .projects
        .create(CreateProject {
            name: body.name,
            description: body.description,
        })
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ProjectBody>,
) -> Result<Json<Project>, (StatusCode, String)> {
    state
        .projects
        .update(
            ProjectId(id),
            UpdateProject {
                name: body.name,
                description: body.description,
            },
        )
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.projects.delete(ProjectId(id)).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[allow(clippy::missing_errors_doc)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
) -> Result<Json<Vec<Task>>, (StatusCode, String)> {
    state
        .tasks
        .list_by_project(ProjectId(project_id))
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state.tasks.get(TaskId(id)).await.map(Json).map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn create_task(
    State(state): State<AppState>,
    Path(project_id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state
        .tasks
        .create(
            ProjectId(project_id),
            CreateTask {
                title: body.title,
                description: body.description,
                status: body.status.unwrap_or(TaskStatus::Todo),
            },
        )
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> Result<Json<Task>, (StatusCode, String)> {
    state
        .tasks
        .update(
            TaskId(id),
            UpdateTask {
                title: body.title,
                description: body.description,
                status: body.status,
            },
        )
        .await
        .map(Json)
        .map_err(reject)
}

#[allow(clippy::missing_errors_doc)]
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.tasks.delete(TaskId(id)).await.map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}
