//! Repository port for task persistence.
//!
//! Implementations report constraint failures as typed variants so the
//! service layer never has to inspect engine-specific error codes.

use crate::task::domain::{NewTask, Task, TaskChanges, TaskFilter, TaskId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
///
/// Each call is expected to be atomic on its own; no call spans another.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task, assigning its identifier and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::ForeignKeyViolation`] when the owner is
    /// unknown to the identity store.
    async fn insert(&self, task: &NewTask) -> TaskRepositoryResult<Task>;

    /// Finds a task by identifier, regardless of owner.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every task matching `filter`. Order is unspecified.
    async fn list(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies a partial update and returns the stored result.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task no longer
    /// exists or [`TaskRepositoryError::UniqueViolation`] when the write
    /// breaks a uniqueness rule.
    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskRepositoryResult<Task>;

    /// Removes a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task no longer
    /// exists or [`TaskRepositoryError::DependencyViolation`] when other
    /// records still reference it.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// The write referenced a row that does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// The write would duplicate a unique value.
    #[error("unique violation: {0}")]
    UniqueViolation(String),

    /// The row is still referenced by dependent records.
    #[error("dependency violation: {0}")]
    DependencyViolation(String),

    /// The task was not found at write time.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persisted data could not be reconstructed into domain types.
    #[error("invalid persisted data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a data-quality or deserialization error from persisted rows.
    pub fn invalid_persisted_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }

    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
