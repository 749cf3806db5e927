//! Taskgate: per-user task tracking with strict ownership isolation.
//!
//! Every stored task belongs to exactly one owner. Callers supply their
//! identity explicitly on each operation, and the service refuses to read,
//! change or remove a task held by anyone else.
//!
//! # Architecture
//!
//! Taskgate follows hexagonal architecture principles:
//!
//! - **Domain**: Task values, write models and filters
//! - **Ports**: The repository contract and its typed storage errors
//! - **Adapters**: In-memory and `PostgreSQL` repositories
//! - **Services**: The ownership gate and error translation
//!
//! # Modules
//!
//! - [`config`]: Database settings read from the environment
//! - [`task`]: Owner-scoped task storage and orchestration

pub mod config;
pub mod task;
