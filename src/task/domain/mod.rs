//! Domain model for per-user task tracking.
//!
//! Tasks belong to exactly one owner for their whole lifetime. The domain
//! layer validates content (non-empty titles, no task born `DONE`) and
//! describes owner-scoped queries, while identity, timestamps and
//! persistence stay outside of the domain boundary.

mod error;
mod filter;
mod ids;
mod task;

pub use error::{InvalidIdentifierError, ParseTaskStatusError, TaskDomainError};
pub use filter::TaskFilter;
pub use ids::{OwnerId, TaskId, TaskTitle};
pub use task::{NewTask, PersistedTaskData, Task, TaskChanges, TaskStatus};
