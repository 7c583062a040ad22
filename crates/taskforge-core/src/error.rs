use crate::types::{ProjectId, TaskId};

/// Core error type for the taskforge system.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error denotes a missing entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ProjectNotFound(_) | Self::TaskNotFound(_))
    }
}
