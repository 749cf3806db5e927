//! Racing writers against the ownership gate.

use std::collections::HashSet;

use rstest::rstest;
use taskgate::task::{
    domain::TaskStatus,
    services::{CreateTaskRequest, TaskServiceError, UpdateTaskRequest},
};

use super::helpers::{ALICE, BOB, TestService, seed_task, service};

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_get_distinct_identifiers(
    service: TestService,
) -> Result<(), eyre::Report> {
    let handles: Vec<_> = (0..16)
        .map(|index| {
            let service = service.clone();
            let owner = if index % 2 == 0 { ALICE } else { BOB };
            tokio::spawn(async move {
                service
                    .create(owner, CreateTaskRequest::new(format!("Task {index}")))
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let task = handle.await??;
        ids.insert(task.id());
    }

    eyre::ensure!(ids.len() == 16, "identifiers collided: {}", ids.len());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_owner_updates_resolve_to_last_write(
    service: TestService,
) -> Result<(), eyre::Report> {
    let task = seed_task(&service, ALICE, "Contested", TaskStatus::Todo).await?;
    let task_id = task.id();

    let first = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .update(ALICE, task_id, UpdateTaskRequest::new().with_title("From tab one"))
                .await
        })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .update(ALICE, task_id, UpdateTaskRequest::new().with_title("From tab two"))
                .await
        })
    };

    let first = first.await??;
    let second = second.await??;
    let stored = service.get(ALICE, task_id).await?;

    let last = if first.updated_at() > second.updated_at() {
        &first
    } else {
        &second
    };
    eyre::ensure!(
        [first.title().as_str(), second.title().as_str()].contains(&stored.title().as_str()),
        "stored title {} matches neither write",
        stored.title()
    );
    if first.updated_at() != second.updated_at() {
        eyre::ensure!(
            stored.title() == last.title(),
            "stored title {} is not the last write {}",
            stored.title(),
            last.title()
        );
    }
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn delete_racing_update_never_resurrects_the_task(
    service: TestService,
) -> Result<(), eyre::Report> {
    let task = seed_task(&service, ALICE, "Doomed", TaskStatus::InProgress).await?;
    let task_id = task.id();

    let update = {
        let service = service.clone();
        tokio::spawn(async move {
            service
                .update(
                    ALICE,
                    task_id,
                    UpdateTaskRequest::new().with_status(TaskStatus::Done),
                )
                .await
        })
    };
    let delete = {
        let service = service.clone();
        tokio::spawn(async move { service.delete(ALICE, task_id).await })
    };

    let update = update.await?;
    delete.await??;

    eyre::ensure!(
        matches!(update, Ok(_) | Err(TaskServiceError::NotFound(_))),
        "update must either win or observe the deletion, got {update:?}"
    );
    let after = service.get(ALICE, task_id).await;
    eyre::ensure!(
        matches!(after, Err(TaskServiceError::NotFound(_))),
        "deleted task reappeared: {after:?}"
    );
    Ok(())
}
