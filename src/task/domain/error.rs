//! Error types for task domain validation and parsing.

use thiserror::Error;

/// Content-level policy violations raised while building task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// A task may not be created already in its terminal state.
    #[error("a task cannot be created with status DONE")]
    CreatedAsDone,
}

impl TaskDomainError {
    /// Returns a short, stable, machine-usable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::EmptyTitle => "empty_title",
            Self::CreatedAsDone => "done_at_creation",
        }
    }
}

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned when an identifier from untrusted input is not positive.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid {kind} identifier {value}: must be positive")]
pub struct InvalidIdentifierError {
    /// Which identifier family was rejected.
    pub kind: &'static str,
    /// The rejected raw value.
    pub value: i64,
}
