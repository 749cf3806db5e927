//! Per-user task tracking.
//!
//! Authenticated callers create, list, update and delete their own tasks.
//! The [`services::TaskOwnershipService`] is the single authorization and
//! consistency checkpoint: it binds new tasks to the caller, scopes every
//! read and write to the owner, refuses to create tasks already `DONE`, and
//! turns storage constraint failures into a fixed error taxonomy. The module
//! follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
