//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{NewTaskRow, TaskChangeset, TaskRow},
    schema::tasks,
};
use crate::config::DatabaseConfig;
use crate::task::{
    domain::{
        NewTask, OwnerId, PersistedTaskData, Task, TaskChanges, TaskFilter, TaskId, TaskStatus,
        TaskTitle,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};
use tracing::{error, info};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// Schema bootstrap for the `users` and `tasks` tables.
pub const CREATE_TASKS_SCHEMA_SQL: &str =
    include_str!("../../../../migrations/2026-10-18-000000_create_users_and_tasks/up.sql");

/// Builds a connection pool from `config`, verifying that at least one
/// connection can be established.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pool cannot connect
/// within the configured timeout.
pub fn connect(config: &DatabaseConfig) -> TaskRepositoryResult<TaskPgPool> {
    let manager = ConnectionManager::<PgConnection>::new(config.database_url());
    let pool = Pool::builder()
        .max_size(config.max_connections())
        .idle_timeout(Some(config.idle_timeout()))
        .connection_timeout(config.connect_timeout())
        .build(manager)
        .map_err(|err| {
            error!(error = %err, "failed to connect to database");
            TaskRepositoryError::persistence(err)
        })?;
    info!(
        max_connections = config.max_connections(),
        "connected to database"
    );
    Ok(pool)
}

/// Applies the bundled task schema to `connection`.
///
/// The statements are idempotent, so running this against an already
/// migrated database is harmless.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when a statement fails.
pub fn apply_schema(connection: &mut PgConnection) -> TaskRepositoryResult<()> {
    connection
        .batch_execute(CREATE_TASKS_SCHEMA_SQL)
        .map_err(TaskRepositoryError::persistence)
}

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &NewTask) -> TaskRepositoryResult<Task> {
        let new_row = NewTaskRow {
            title: task.title().as_str().to_owned(),
            description: task.description().map(str::to_owned),
            status: task.status().as_str().to_owned(),
            owner_id: task.owner_id().value(),
        };

        self.run_blocking(move |connection| {
            let row = diesel::insert_into(tasks::table)
                .values(&new_row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(|err| translate_write_error(err, WriteOperation::Insert))?;
            row_to_task(row)
        })
        .await
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.value()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(TaskRepositoryError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list(&self, filter: &TaskFilter) -> TaskRepositoryResult<Vec<Task>> {
        let owner_id = filter.owner_id().value();
        let status = filter.status().map(|value| value.as_str().to_owned());
        let title_pattern = filter.search().map(contains_pattern);

        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::owner_id.eq(owner_id))
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(status_value) = status {
                query = query.filter(tasks::status.eq(status_value));
            }
            if let Some(pattern) = title_pattern {
                query = query.filter(tasks::title.ilike(pattern));
            }
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(TaskRepositoryError::persistence)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update(&self, id: TaskId, changes: &TaskChanges) -> TaskRepositoryResult<Task> {
        let changeset = TaskChangeset {
            title: changes.title().map(|title| title.as_str().to_owned()),
            description: changes
                .description()
                .map(|description| description.map(str::to_owned)),
            status: changes.status().map(|status| status.as_str().to_owned()),
        };

        self.run_blocking(move |connection| {
            let row = diesel::update(tasks::table.filter(tasks::id.eq(id.value())))
                .set((&changeset, tasks::updated_at.eq(diesel::dsl::now)))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(|err| translate_write_error(err, WriteOperation::Update))?
                .ok_or(TaskRepositoryError::NotFound(id))?;
            row_to_task(row)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(tasks::table.filter(tasks::id.eq(id.value())))
                .execute(connection)
                .map_err(|err| translate_write_error(err, WriteOperation::Delete))?;
            if deleted == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        status,
        owner_id,
        created_at,
        updated_at,
    } = row;

    let title = TaskTitle::new(title).map_err(TaskRepositoryError::invalid_persisted_data)?;
    let status =
        TaskStatus::try_from(status.as_str()).map_err(TaskRepositoryError::invalid_persisted_data)?;

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(id),
        owner_id: OwnerId::new(owner_id),
        title,
        description,
        status,
        created_at,
        updated_at,
    }))
}

/// Builds an `ILIKE` pattern that matches `term` literally anywhere in the
/// column.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Write statement that produced a database error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOperation {
    Insert,
    Update,
    Delete,
}

/// Constraint family recognised in engine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstraintFailure {
    ForeignKey,
    Unique,
    Dependency,
}

/// Maps engine error kinds to constraint families.
///
/// `PostgreSQL` reports a row that is still referenced with the same
/// foreign-key code used for a dangling reference, so the statement decides
/// which one it is.
const fn classify(kind: &DatabaseErrorKind, operation: WriteOperation) -> Option<ConstraintFailure> {
    match (kind, operation) {
        (DatabaseErrorKind::ForeignKeyViolation, WriteOperation::Delete) => {
            Some(ConstraintFailure::Dependency)
        }
        (DatabaseErrorKind::ForeignKeyViolation, _) => Some(ConstraintFailure::ForeignKey),
        (DatabaseErrorKind::UniqueViolation, _) => Some(ConstraintFailure::Unique),
        _ => None,
    }
}

fn constraint_detail(info: &dyn DatabaseErrorInformation) -> String {
    info.constraint_name()
        .unwrap_or_else(|| info.message())
        .to_owned()
}

fn translate_write_error(err: DieselError, operation: WriteOperation) -> TaskRepositoryError {
    let classified = match &err {
        DieselError::DatabaseError(kind, info) => {
            classify(kind, operation).map(|failure| (failure, constraint_detail(info.as_ref())))
        }
        _ => None,
    };

    match classified {
        Some((ConstraintFailure::ForeignKey, detail)) => {
            TaskRepositoryError::ForeignKeyViolation(detail)
        }
        Some((ConstraintFailure::Unique, detail)) => TaskRepositoryError::UniqueViolation(detail),
        Some((ConstraintFailure::Dependency, detail)) => {
            TaskRepositoryError::DependencyViolation(detail)
        }
        None => TaskRepositoryError::persistence(err),
    }
}
