//! Service-level error taxonomy and the storage translation table.

use crate::task::{
    domain::{OwnerId, TaskDomainError, TaskId},
    ports::TaskRepositoryError,
};
use std::fmt;
use thiserror::Error;

/// The fixed vocabulary used to describe task service failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskErrorKind {
    /// No task exists with the requested identifier.
    NotFound,
    /// The task exists but belongs to another owner.
    Forbidden,
    /// A storage constraint was or would be violated.
    Conflict,
    /// A content-level policy was violated.
    Validation,
    /// Anything else, including unrecognised storage failures.
    Internal,
}

impl TaskErrorKind {
    /// Returns the canonical lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict => "conflict",
            Self::Validation => "validation",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for TaskErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint family behind a [`TaskServiceError::Conflict`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictReason {
    /// The referenced owner does not exist in the identity store.
    OwnerMissing,
    /// The write would duplicate a unique value.
    Duplicate,
    /// Other records still reference the task.
    StillReferenced,
}

impl ConflictReason {
    /// Returns a short, stable, machine-usable reason code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OwnerMissing => "owner_missing",
            Self::Duplicate => "duplicate_task",
            Self::StillReferenced => "task_still_referenced",
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by [`super::TaskOwnershipService`].
///
/// Every failure reaching a caller is exactly one of these five variants.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The task exists but the caller does not own it.
    #[error("caller {caller} does not own task {task_id}")]
    Forbidden {
        /// Requested task.
        task_id: TaskId,
        /// Identity that was denied.
        caller: OwnerId,
    },

    /// A storage constraint was violated.
    #[error("conflict: {reason} ({detail})")]
    Conflict {
        /// Constraint family.
        reason: ConflictReason,
        /// Storage-supplied detail, such as the constraint name.
        detail: String,
    },

    /// Content policy rejected the request.
    #[error(transparent)]
    Validation(#[from] TaskDomainError),

    /// Unexpected failure; the storage error is preserved as the source.
    #[error("internal task storage failure")]
    Internal(#[source] TaskRepositoryError),
}

impl TaskServiceError {
    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> TaskErrorKind {
        match self {
            Self::NotFound(_) => TaskErrorKind::NotFound,
            Self::Forbidden { .. } => TaskErrorKind::Forbidden,
            Self::Conflict { .. } => TaskErrorKind::Conflict,
            Self::Validation(_) => TaskErrorKind::Validation,
            Self::Internal(_) => TaskErrorKind::Internal,
        }
    }

    /// Returns a short, stable, machine-usable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "task_not_found",
            Self::Forbidden { .. } => "not_task_owner",
            Self::Conflict { reason, .. } => reason.as_str(),
            Self::Validation(err) => err.reason(),
            Self::Internal(_) => "storage_failure",
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Translates a storage failure into the service taxonomy.
///
/// Constraint violations of every family become [`TaskServiceError::Conflict`]
/// and a row that vanished before the write becomes
/// [`TaskServiceError::NotFound`]. Anything else is surfaced unchanged inside
/// [`TaskServiceError::Internal`].
#[must_use]
pub fn translate_storage_error(err: TaskRepositoryError) -> TaskServiceError {
    match err {
        TaskRepositoryError::ForeignKeyViolation(detail) => TaskServiceError::Conflict {
            reason: ConflictReason::OwnerMissing,
            detail,
        },
        TaskRepositoryError::UniqueViolation(detail) => TaskServiceError::Conflict {
            reason: ConflictReason::Duplicate,
            detail,
        },
        TaskRepositoryError::DependencyViolation(detail) => TaskServiceError::Conflict {
            reason: ConflictReason::StillReferenced,
            detail,
        },
        TaskRepositoryError::NotFound(id) => TaskServiceError::NotFound(id),
        other @ (TaskRepositoryError::InvalidPersistedData(_)
        | TaskRepositoryError::Persistence(_)) => TaskServiceError::Internal(other),
    }
}
