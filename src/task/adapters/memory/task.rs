//! In-memory repository for task tracking tests.

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{NewTask, OwnerId, Task, TaskChanges, TaskFilter, TaskId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Identifiers are issued from a counter starting at 1 and timestamps come
/// from the injected clock. Two optional behaviours stand in for relational
/// constraints: a registry of known owners (foreign key on insert) and a set
/// of pinned tasks that still have dependents (restrict on delete).
#[derive(Clone)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

#[derive(Debug)]
struct InMemoryTaskState {
    tasks: BTreeMap<TaskId, Task>,
    next_id: i64,
    known_owners: Option<HashSet<OwnerId>>,
    pinned: HashSet<TaskId>,
}

impl Default for InMemoryTaskState {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            next_id: 1,
            known_owners: None,
            pinned: HashSet::new(),
        }
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty repository that accepts any owner.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }

    /// Creates an empty repository stamping records with `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            state: Arc::new(RwLock::new(InMemoryTaskState::default())),
            clock,
        }
    }

    /// Restricts inserts to the given owners; any other owner is reported
    /// as a foreign key violation.
    ///
    /// Only the owner registry is replaced. Stored tasks, pins and the id
    /// counter are kept, and clones sharing this state see the registry too.
    #[must_use]
    pub fn with_known_owners(self, owners: impl IntoIterator<Item = OwnerId>) -> Self {
        let owners = owners.into_iter().collect();
        {
            let mut state = self
                .state
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.known_owners = Some(owners);
        }
        self
    }

    /// Marks a task as referenced by a dependent record so that deleting it
    /// fails until [`Self::unpin`] is called.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the state lock is
    /// poisoned.
    pub fn pin(&self, id: TaskId) -> TaskRepositoryResult<()> {
        write_state(&self.state)?.pinned.insert(id);
        Ok(())
    }

    /// Removes the dependent-record marker added by [`Self::pin`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the state lock is
    /// poisoned.
    pub fn unpin(&self, id: TaskId) -> TaskRepositoryResult<()> {
        write_state(&self.state)?.pinned.remove(&id);
        Ok(())
    }

    /// Returns the number of stored tasks across all owners.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the state lock is
    /// poisoned.
    pub fn len(&self) -> TaskRepositoryResult<usize> {
        Ok(read_state(&self.state)?.tasks.len())
    }

    /// Returns `true` when no tasks are stored.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the state lock is
    /// poisoned.
    pub fn is_empty(&self) -> TaskRepositoryResult<bool> {
        Ok(read_state(&self.state)?.tasks.is_empty())
    }
}

impl Default for InMemoryTaskRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InMemoryTaskRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryTaskRepository")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn read_state(
    state: &RwLock<InMemoryTaskState>,
) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
    state
        .read()
        .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
}

fn write_state(
    state: &RwLock<InMemoryTaskState>,
) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
    state
        .write()
        .map_err(|err| TaskRepositoryError::persistence(std::io::Error::other(err.to_string())))
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert(&self, task: &NewTask) -> TaskRepositoryResult<Task> {
        let mut state = write_state(&self.state)?;
        let owner_id = task.owner_id();
        if state
            .known_owners
            .as_ref()
            .is_some_and(|owners| !owners.contains(&owner_id))
        {
            return Err(TaskRepositoryError::ForeignKeyViolation(format!(
                "owner {owner_id} does not exist"
            )));
        }

        let id = TaskId::new(state.next_id);
        state.next_id += 1;
        let stored = task.clone().into_task(id, self.clock.utc());
        state.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        let state = read_state(&self.state)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn list(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let state = read_state(&self.state)?;
        Ok(state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect())
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskRepositoryResult<Task> {
        let mut state = write_state(&self.state)?;
        let task = state
            .tasks
            .get_mut(&id)
            .ok_or(TaskRepositoryError::NotFound(id))?;
        // Stamped under the lock so timestamps follow write order.
        task.apply_changes(changes, self.clock.utc());
        Ok(task.clone())
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = write_state(&self.state)?;
        if !state.tasks.contains_key(&id) {
            return Err(TaskRepositoryError::NotFound(id));
        }
        if state.pinned.contains(&id) {
            return Err(TaskRepositoryError::DependencyViolation(format!(
                "task {id} is still referenced"
            )));
        }
        state.tasks.remove(&id);
        Ok(())
    }
}
