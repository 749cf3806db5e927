//! Shared test helpers for `PostgreSQL` integration tests.

use std::error::Error;

use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{BigInt, Text};
use pg_embedded_setup_unpriv::TestCluster;
use taskgate::task::{
    adapters::postgres::{PostgresTaskRepository, apply_schema},
    domain::{OwnerId, TaskId},
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Boxed error used by fallible helpers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "taskgate_test_template";

/// Creates a tokio runtime for async operations in tests.
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the task schema applied.
///
/// # Errors
///
/// Returns an error if template creation or schema bootstrap fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            apply_schema(&mut conn).map_err(|e| eyre::eyre!("{e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// Returns a fresh database name with the given prefix.
pub fn unique_db_name(prefix: &str) -> String {
    format!("{prefix}_{}", Uuid::new_v4().simple())
}

/// Guard that drops a test database even if the test panics.
pub struct CleanupGuard<'a> {
    cluster: &'a TestCluster,
    db_name: String,
}

impl<'a> CleanupGuard<'a> {
    pub const fn new(cluster: &'a TestCluster, db_name: String) -> Self {
        Self { cluster, db_name }
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(self.db_name.as_str()) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.db_name);
        }
    }
}

/// Creates `db_name` from the template and returns its connection URL.
///
/// # Errors
///
/// Returns an error if the database cannot be cloned from the template.
pub fn create_database(cluster: &TestCluster, db_name: &str) -> Result<String, BoxError> {
    cluster
        .create_database_from_template(db_name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(cluster.connection().database_url(db_name))
}

/// Creates a test database from the template and returns a repository
/// over a single-connection pool.
///
/// # Errors
///
/// Returns an error if the database or pool cannot be created.
pub fn setup_repository(
    cluster: &TestCluster,
    db_name: &str,
) -> Result<PostgresTaskRepository, BoxError> {
    let url = create_database(cluster, db_name)?;
    let manager = ConnectionManager::<PgConnection>::new(url);
    // Pool size of 1 keeps statement order deterministic.
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(PostgresTaskRepository::new(pool))
}

/// Opens a direct connection for fixture rows the repository does not own.
pub fn connect_direct(cluster: &TestCluster, db_name: &str) -> PgConnection {
    let url = cluster.connection().database_url(db_name);
    PgConnection::establish(&url).expect("direct connection")
}

#[derive(QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = BigInt)]
    id: i64,
}

/// Inserts a user row and returns its identity.
pub fn insert_user(conn: &mut PgConnection, email: &str) -> OwnerId {
    let row = diesel::sql_query(
        "INSERT INTO users (email, password_hash) VALUES ($1, 'not-a-real-hash') RETURNING id",
    )
    .bind::<Text, _>(email)
    .get_result::<InsertedId>(conn)
    .expect("insert user");
    OwnerId::try_from(row.id).expect("serial ids are positive")
}

/// Adds a table whose rows keep tasks referenced, with no cascade.
pub fn create_attachments_table(conn: &mut PgConnection) {
    diesel::sql_query(
        "CREATE TABLE task_attachments (\
             id BIGSERIAL PRIMARY KEY, \
             task_id BIGINT NOT NULL REFERENCES tasks (id)\
         )",
    )
    .execute(conn)
    .expect("create attachments table");
}

/// Attaches a dependent row to `task_id`.
pub fn attach_to(conn: &mut PgConnection, task_id: TaskId) {
    diesel::sql_query("INSERT INTO task_attachments (task_id) VALUES ($1)")
        .bind::<BigInt, _>(task_id.value())
        .execute(conn)
        .expect("attach row");
}
