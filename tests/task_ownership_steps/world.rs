//! Shared world state for task ownership BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use rstest::fixture;
use taskgate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{OwnerId, Task},
    services::{TaskOwnershipService, TaskServiceError},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskOwnershipService<InMemoryTaskRepository>;

/// Scenario world for task ownership behaviour tests.
pub struct TaskOwnershipWorld {
    pub service: TestTaskService,
    pub users: HashMap<String, OwnerId>,
    pub current_task: Option<Task>,
    pub last_outcome: Option<Result<(), TaskServiceError>>,
}

impl TaskOwnershipWorld {
    /// Creates a world with no users and no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: TaskOwnershipService::new(Arc::new(InMemoryTaskRepository::new())),
            users: HashMap::new(),
            current_task: None,
            last_outcome: None,
        }
    }

    /// Returns the identity for `name`, assigning the next one on first use.
    pub fn user(&mut self, name: &str) -> OwnerId {
        let next = i64::try_from(self.users.len()).map_or(i64::MAX, |count| count + 1);
        *self
            .users
            .entry(name.to_owned())
            .or_insert_with(|| OwnerId::new(next))
    }

    /// Returns the identity already assigned to `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` has not appeared in an earlier step.
    pub fn known_user(&self, name: &str) -> Result<OwnerId, eyre::Report> {
        self.users
            .get(name)
            .copied()
            .ok_or_else(|| eyre::eyre!("unknown scenario user {name}"))
    }

    /// Returns the task the scenario is working on.
    ///
    /// # Errors
    ///
    /// Returns an error if no task has been created yet.
    pub fn current_task(&self) -> Result<&Task, eyre::Report> {
        self.current_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing current task in scenario world"))
    }

    /// Returns the outcome of the most recent operation.
    ///
    /// # Errors
    ///
    /// Returns an error if no operation has run yet.
    pub fn last_outcome(&self) -> Result<&Result<(), TaskServiceError>, eyre::Report> {
        self.last_outcome
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing operation outcome in scenario world"))
    }
}

impl Default for TaskOwnershipWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskOwnershipWorld {
    TaskOwnershipWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
