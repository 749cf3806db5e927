//! Application services for owner-scoped task operations.

mod error;
mod ownership;

pub use error::{
    ConflictReason, TaskErrorKind, TaskServiceError, TaskServiceResult, translate_storage_error,
};
pub use ownership::{CreateTaskRequest, ListTasksQuery, TaskOwnershipService, UpdateTaskRequest};
