use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use taskforge_core::error::Error;
use taskforge_core::traits::{ProjectStore, TaskStore};
use taskforge_core::types::{
    CreateProject, CreateTask, Project, ProjectId, Task, TaskId, TaskStatus, UpdateProject,
    UpdateTask,
};

/// In-memory store implementing both facade traits for transport tests.
#[derive(Default)]
pub struct MockStore {
    projects: RwLock<Vec<Project>>,
    tasks: RwLock<Vec<Task>>,
    next_id: AtomicI64,
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Self::default()
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl ProjectStore for MockStore {
    async fn list(&self) -> Result<Vec<Project>, Error> {
        Ok(self.projects.read().unwrap().clone())
    }

    async fn get(&self, id: ProjectId) -> Result<Project, Error> {
        self.projects
            .read()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::ProjectNotFound(id))
    }

    async fn create(&self, params: CreateProject) -> Result<Project, Error> {
        let project = Project {
            id: ProjectId(self.next_id()),
            name: params.name,
            description: params.description,
            created_at: Utc::now(),
        };
        self.projects.write().unwrap().push(project.clone());
        Ok(project)
    }

    async fn update(&self, id: ProjectId, params: UpdateProject) -> Result<Project, Error> {
        let mut projects = self.projects.write().unwrap();
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(Error::ProjectNotFound(id))?;
        project.name = params.name;
        project.description = params.description;
        Ok(project.clone())
    }

    async fn delete(&self, id: ProjectId) -> Result<(), Error> {
        let mut projects = self.projects.write().unwrap();
        let before = projects.len();
        projects.retain(|p| p.id != id);
        if projects.len() == before {
            return Err(Error::ProjectNotFound(id));
        }
        self.tasks.write().unwrap().retain(|t| t.project_id != id);
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MockStore {
    async fn list_by_project(&self, project_id: ProjectId) -> Result<Vec<Task>, Error> {
        Ok(self
            .tasks
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: TaskId) -> Result<Task, Error> {
        self.tasks
            .read()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(Error::TaskNotFound(id))
    }

    async fn create(&self, project_id: ProjectId, params: CreateTask) -> Result<Task, Error> {
        if !self
            .projects
            .read()
            .unwrap()
            .iter()
            .any(|p| p.id == project_id)
        {
            return Err(Error::ProjectNotFound(project_id));
        }
        let task = Task {
            id: TaskId(self.next_id()),
            project_id,
            title: params.title,
            description: params.description,
            status: params.status,
            created_at: Utc::now(),
        };
        self.tasks.write().unwrap().push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: TaskId, params: UpdateTask) -> Result<Task, Error> {
        let mut tasks = self.tasks.write().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::TaskNotFound(id))?;
        task.title = params.title;
        task.description = params.description;
        if let Some(status) = params.status {
            task.status = status;
        }
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> Result<(), Error> {
        let mut tasks = self.tasks.write().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(Error::TaskNotFound(id));
        }
        Ok(())
    }

    async fn find_by_status(&self, status: TaskStatus) -> Result<Vec<Task>, Error> {
        Ok(self
            .tasks
            .read()
            .unwrap()
            .iter()
            .filter(|t| t.status == status)
            .cloned()
            .collect())
    }
}
