//! Service layer for owner-scoped task operations.
//!
//! Every operation receives the caller identity explicitly. Single-task
//! operations pass through the ownership gate before doing anything else;
//! list queries carry the owner as a mandatory filter instead.

use super::error::{TaskErrorKind, TaskServiceError, TaskServiceResult, translate_storage_error};
use crate::task::{
    domain::{
        NewTask, OwnerId, Task, TaskChanges, TaskDomainError, TaskFilter, TaskId, TaskStatus,
        TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use std::sync::Arc;
use tracing::{debug, error, instrument, warn};

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: Option<String>,
    status: Option<TaskStatus>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Request payload for a partial task update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    title: Option<String>,
    description: Option<Option<String>>,
    status: Option<TaskStatus>,
}

impl UpdateTaskRequest {
    /// Creates a request that changes nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(Some(description.into()));
        self
    }

    /// Removes the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = Some(None);
        self
    }

    /// Sets the status. Unlike creation, any status is accepted.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn into_changes(self) -> Result<TaskChanges, TaskDomainError> {
        let mut changes = TaskChanges::new();
        if let Some(title) = self.title {
            changes = changes.with_title(TaskTitle::new(title)?);
        }
        match self.description {
            Some(Some(description)) => changes = changes.with_description(description),
            Some(None) => changes = changes.clear_description(),
            None => {}
        }
        if let Some(status) = self.status {
            changes = changes.with_status(status);
        }
        Ok(changes)
    }
}

/// Optional narrowing for [`TaskOwnershipService::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTasksQuery {
    status: Option<TaskStatus>,
    search: Option<String>,
}

impl ListTasksQuery {
    /// Creates a query with no constraints beyond ownership.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts results to an exact status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to titles containing `search`, ignoring case.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    fn into_filter(self, owner_id: OwnerId) -> TaskFilter {
        let mut filter = TaskFilter::for_owner(owner_id);
        if let Some(status) = self.status {
            filter = filter.with_status(status);
        }
        if let Some(search) = self.search {
            filter = filter.with_search(search);
        }
        filter
    }
}

/// Owner-scoped task service.
#[derive(Clone)]
pub struct TaskOwnershipService<R>
where
    R: TaskRepository,
{
    repository: Arc<R>,
}

impl<R> TaskOwnershipService<R>
where
    R: TaskRepository,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Creates a task owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Validation`] for an empty title or an
    /// initial status of `DONE` (nothing is persisted in either case), and
    /// [`TaskServiceError::Conflict`] when storage rejects the owner.
    #[instrument(skip(self, request), fields(owner_id = %caller))]
    pub async fn create(
        &self,
        caller: OwnerId,
        request: CreateTaskRequest,
    ) -> TaskServiceResult<Task> {
        let CreateTaskRequest {
            title,
            description,
            status,
        } = request;

        let new_task = NewTask::new(caller, TaskTitle::new(title)?, description, status)?;
        let task = self
            .repository
            .insert(&new_task)
            .await
            .map_err(|err| storage_failure("create", err))?;
        debug!(task_id = %task.id(), "task created");
        Ok(task)
    }

    /// Lists tasks owned by `caller`, optionally narrowed by `query`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Internal`] when the storage read fails.
    #[instrument(skip(self, query), fields(owner_id = %caller))]
    pub async fn list(&self, caller: OwnerId, query: ListTasksQuery) -> TaskServiceResult<Vec<Task>> {
        let filter = query.into_filter(caller);
        let tasks = self
            .repository
            .list(&filter)
            .await
            .map_err(|err| storage_failure("list", err))?;
        debug!(count = tasks.len(), "tasks listed");
        Ok(tasks)
    }

    /// Returns a single task owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no such task exists and
    /// [`TaskServiceError::Forbidden`] when another owner holds it.
    #[instrument(skip(self), fields(owner_id = %caller, task_id = %id))]
    pub async fn get(&self, caller: OwnerId, id: TaskId) -> TaskServiceResult<Task> {
        self.find_owned(caller, id).await
    }

    /// Applies a partial update to a task owned by `caller`.
    ///
    /// Ownership is checked before the write and the write itself is not
    /// conditional on it: two concurrent updates from the owner race, and
    /// the last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::Forbidden`] from the ownership gate,
    /// [`TaskServiceError::Validation`] for an empty replacement title, and
    /// [`TaskServiceError::Conflict`] when storage rejects the write.
    #[instrument(skip(self, request), fields(owner_id = %caller, task_id = %id))]
    pub async fn update(
        &self,
        caller: OwnerId,
        id: TaskId,
        request: UpdateTaskRequest,
    ) -> TaskServiceResult<Task> {
        self.find_owned(caller, id).await?;
        let changes = request.into_changes()?;
        let task = self
            .repository
            .update(id, &changes)
            .await
            .map_err(|err| storage_failure("update", err))?;
        debug!(status = %task.status(), "task updated");
        Ok(task)
    }

    /// Deletes a task owned by `caller`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] or
    /// [`TaskServiceError::Forbidden`] from the ownership gate and
    /// [`TaskServiceError::Conflict`] when other records still reference
    /// the task.
    #[instrument(skip(self), fields(owner_id = %caller, task_id = %id))]
    pub async fn delete(&self, caller: OwnerId, id: TaskId) -> TaskServiceResult<()> {
        self.find_owned(caller, id).await?;
        self.repository
            .delete(id)
            .await
            .map_err(|err| storage_failure("delete", err))?;
        debug!("task deleted");
        Ok(())
    }

    /// Ownership gate: existence first, then ownership.
    ///
    /// The lookup is by identifier only so that a task held by someone else
    /// is reported as forbidden rather than missing.
    async fn find_owned(&self, caller: OwnerId, id: TaskId) -> TaskServiceResult<Task> {
        let task = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| storage_failure("find", err))?
            .ok_or(TaskServiceError::NotFound(id))?;

        if !task.is_owned_by(caller) {
            warn!(task_id = %id, owner_id = %caller, "ownership check denied access");
            return Err(TaskServiceError::Forbidden {
                task_id: id,
                caller,
            });
        }
        Ok(task)
    }
}

fn storage_failure(operation: &'static str, err: TaskRepositoryError) -> TaskServiceError {
    let mapped = translate_storage_error(err);
    match mapped.kind() {
        TaskErrorKind::Conflict => {
            warn!(operation, reason = mapped.reason(), error = %mapped, "storage constraint violated");
        }
        TaskErrorKind::Internal => {
            error!(operation, error = ?mapped, "unexpected storage failure");
        }
        TaskErrorKind::NotFound | TaskErrorKind::Forbidden | TaskErrorKind::Validation => {}
    }
    mapped
}
