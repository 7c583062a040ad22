use async_trait::async_trait;
use sqlx::PgPool;

use taskforge_core::error::Error;
use taskforge_core::traits::{ProjectStore, TaskStore};
use taskforge_core::types::{
    CreateProject, CreateTask, Project, ProjectId, Task, TaskId, TaskStatus, UpdateProject,
    UpdateTask,
};

/// Postgres-backed implementation of both storage traits.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn db_error(op: &'static str) -> impl FnOnce(sqlx::Error) -> Error {
    move |e| {
        tracing::error!(op, error = %e, "database query failed");
        Error::Database(e.to_string())
    }
}

impl PgStore {
    /// Create a new `PgStore` with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if migrations fail to apply.
    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for PgStore {
    async fn list(&self) -> Result<Vec<Project>, Error> {
        let rows = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, created_at FROM projects ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list projects"))?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: ProjectId) -> Result<Project, Error> {
        let row = sqlx::query_as::<_, ProjectRow>(
            "SELECT id, name, description, created_at FROM projects WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get project"))?
        .ok_or(Error::ProjectNotFound(id))?;

        Ok(row.into())
    }

    async fn create(&self, params: CreateProject) -> Result<Project, Error> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r"
            INSERT INTO projects (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at
            ",
        )
        .bind(&params.name)
        .bind(&params.description)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create project"))?;

        Ok(row.into())
    }

    async fn update(&self, id: ProjectId, params: UpdateProject) -> Result<Project, Error> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r"
            UPDATE projects
            SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, created_at
            ",
        )
        .bind(id.0)
        .bind(&params.name)
        .bind(&params.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update project"))?
        .ok_or(Error::ProjectNotFound(id))?;

        Ok(row.into())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete project"))?;

        if result.rows_affected() == 0 {
            return Err(Error::ProjectNotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>, Error> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, project_id, title, description, status, created_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY id
            ",
        )
        .bind(project_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list tasks"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(&self, id: TaskId) -> Result<Task, Error> {
        let row = sqlx::query_as::<_, TaskRow>(
            "SELECT id, project_id, title, description, status, created_at FROM tasks WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("get task"))?
        .ok_or(Error::TaskNotFound(id))?;

        row.try_into()
    }

    async fn create(&self, project_id: ProjectId, params: CreateTask) -> Result<Task, Error> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            INSERT INTO tasks (project_id, title, description, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, project_id, title, description, status, created_at
            ",
        )
        .bind(project_id.0)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_foreign_key_violation())
            {
                Error::ProjectNotFound(project_id)
            } else {
                db_error("create task")(e)
            }
        })?;

        row.try_into()
    }

    async fn update(&self, id: TaskId, params: UpdateTask) -> Result<Task, Error> {
        let row = sqlx::query_as::<_, TaskRow>(
            r"
            UPDATE tasks
            SET title = $2,
                description = $3,
                status = COALESCE($4, status)
            WHERE id = $1
            RETURNING id, project_id, title, description, status, created_at
            ",
        )
        .bind(id.0)
        .bind(&params.title)
        .bind(&params.description)
        .bind(params.status.map(TaskStatus::as_str))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update task"))?
        .ok_or(Error::TaskNotFound(id))?;

        row.try_into()
    }

    async fn delete(&self, id: TaskId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(db_error("delete task"))?;

        if result.rows_affected() == 0 {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, Error> {
        let rows = sqlx::query_as::<_, TaskRow>(
            r"
            SELECT id, project_id, title, description, status, created_at
            FROM tasks
            WHERE status = $1
            ORDER BY id
            ",
        )
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("find tasks by status"))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

// --- Internal row types for sqlx ---

#[derive(sqlx::FromRow)]
struct ProjectRow {
    id: i64,
    name: String,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Self {
            id: ProjectId(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    project_id: i64,
    title: String,
    description: Option<String>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = Error;

    fn try_from(row: TaskRow) -> Result<Self, Error> {
        let status = TaskStatus::parse(&row.status).map_err(|_| {
            tracing::error!(task = row.id, status = %row.status, "corrupt task status in row");
            Error::Database(format!("corrupt task status '{}'", row.status))
        })?;
        Ok(Self {
            id: TaskId(row.id),
            project_id: ProjectId(row.project_id),
            title: row.title,
            description: row.description,
            status,
            created_at: row.created_at,
        })
    }
}
