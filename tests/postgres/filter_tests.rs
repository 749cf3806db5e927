//! Owner-scoped listing through the `ILIKE` query.

use std::sync::Arc;

use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::rstest;
use taskgate::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{OwnerId, Task, TaskFilter, TaskStatus},
    ports::TaskRepository,
    services::{CreateTaskRequest, ListTasksQuery, TaskOwnershipService},
};

use super::helpers::{
    CleanupGuard, connect_direct, ensure_template, insert_user, setup_repository, test_runtime,
    unique_db_name,
};

fn titles(tasks: &[Task]) -> Vec<String> {
    let mut titles: Vec<String> = tasks
        .iter()
        .map(|task| task.title().as_str().to_owned())
        .collect();
    titles.sort();
    titles
}

fn seed(
    rt: &tokio::runtime::Runtime,
    service: &TaskOwnershipService<PostgresTaskRepository>,
    owner: OwnerId,
    entries: &[(&str, TaskStatus)],
) {
    for (title, status) in entries {
        rt.block_on(service.create(owner, CreateTaskRequest::new(*title).with_status(*status)))
            .expect("seed task");
    }
}

#[rstest]
#[case::everything(ListTasksQuery::new(), &["100% done", "Buy  milk", "FOOtnote", "Fix foo", "foo_bar"])]
#[case::search_ignores_case(ListTasksQuery::new().with_search("FOO"), &["FOOtnote", "Fix foo", "foo_bar"])]
#[case::percent_is_literal(ListTasksQuery::new().with_search("0%"), &["100% done"])]
#[case::underscore_is_literal(ListTasksQuery::new().with_search("o_b"), &["foo_bar"])]
#[case::whitespace_is_literal(ListTasksQuery::new().with_search("  "), &["Buy  milk"])]
#[case::empty_search(ListTasksQuery::new().with_search(""), &["100% done", "Buy  milk", "FOOtnote", "Fix foo", "foo_bar"])]
#[case::status_and_search(
    ListTasksQuery::new().with_status(TaskStatus::InProgress).with_search("foo"),
    &["Fix foo"]
)]
fn listing_filters_within_owned_tasks(
    shared_test_cluster: &'static TestCluster,
    #[case] query: ListTasksQuery,
    #[case] expected: &[&str],
) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("test_list_filters");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = setup_repository(shared_test_cluster, &db_name).expect("repository setup");
    let mut conn = connect_direct(shared_test_cluster, &db_name);
    let alice = insert_user(&mut conn, "alice@example.com");
    let bob = insert_user(&mut conn, "bob@example.com");
    let service = TaskOwnershipService::new(Arc::new(repo));
    let rt = test_runtime();
    seed(
        &rt,
        &service,
        alice,
        &[
            ("Fix foo", TaskStatus::InProgress),
            ("FOOtnote", TaskStatus::Todo),
            ("foo_bar", TaskStatus::Todo),
            ("100% done", TaskStatus::InProgress),
            ("Buy  milk", TaskStatus::Todo),
        ],
    );
    seed(&rt, &service, bob, &[("Bob foo", TaskStatus::InProgress)]);

    let tasks = rt
        .block_on(service.list(alice, query))
        .expect("list should succeed");

    assert!(tasks.iter().all(|task| task.owner_id() == alice));
    assert_eq!(titles(&tasks), expected);
}

#[rstest]
fn repository_list_is_scoped_to_filter_owner(shared_test_cluster: &'static TestCluster) {
    ensure_template(shared_test_cluster).expect("template setup");
    let db_name = unique_db_name("test_list_scope");
    let _guard = CleanupGuard::new(shared_test_cluster, db_name.clone());
    let repo = Arc::new(setup_repository(shared_test_cluster, &db_name).expect("repository setup"));
    let mut conn = connect_direct(shared_test_cluster, &db_name);
    let alice = insert_user(&mut conn, "alice@example.com");
    let bob = insert_user(&mut conn, "bob@example.com");
    let service = TaskOwnershipService::new(Arc::clone(&repo));
    let rt = test_runtime();
    seed(&rt, &service, bob, &[("Bob only", TaskStatus::Todo)]);

    let tasks = rt
        .block_on(repo.list(&TaskFilter::for_owner(alice)))
        .expect("list should succeed");

    assert!(tasks.is_empty());
}
