//! `PostgreSQL` adapters for task persistence.

mod models;
mod repository;
mod schema;

pub use repository::{
    CREATE_TASKS_SCHEMA_SQL, PostgresTaskRepository, TaskPgPool, apply_schema, connect,
};
