//! Owner-scoped list query.

use super::{OwnerId, Task, TaskStatus};

/// Narrowing criteria for listing tasks.
///
/// A filter is always scoped to a single owner; there is no way to build one
/// without it. The optional criteria combine with AND semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    owner_id: OwnerId,
    status: Option<TaskStatus>,
    search: Option<String>,
}

impl TaskFilter {
    /// Creates a filter matching every task owned by `owner_id`.
    #[must_use]
    pub const fn for_owner(owner_id: OwnerId) -> Self {
        Self {
            owner_id,
            status: None,
            search: None,
        }
    }

    /// Restricts results to an exact status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Restricts results to titles containing `search`, ignoring case.
    ///
    /// An empty string places no constraint on the title. Any other term,
    /// whitespace included, is matched literally.
    #[must_use]
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let term = search.into();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    /// Returns the mandatory owner constraint.
    #[must_use]
    pub const fn owner_id(&self) -> OwnerId {
        self.owner_id
    }

    /// Returns the status constraint, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns the title search term, if any.
    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    /// Evaluates the filter against a task in memory.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if !task.is_owned_by(self.owner_id) {
            return false;
        }
        if self.status.is_some_and(|status| task.status() != status) {
            return false;
        }
        self.search.as_deref().is_none_or(|term| {
            task.title()
                .as_str()
                .to_lowercase()
                .contains(&term.to_lowercase())
        })
    }
}
