//! Integration tests for Tasks domain
//!
//! These tests use real PostgreSQL via testcontainers to ensure:
//! - Display order assignment works under real transactions
//! - Reorder is all-or-nothing
//! - Concurrent operations are handled properly

use domain_tasks::*;
use test_utils::{TestDatabase, TestDataBuilder, assertions::*};
use uuid::Uuid;

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
async fn test_create_and_get_task() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("create_and_get");

    let input = CreateTask {
        title: builder.name("task", "main"),
    };

    let created = repo.create(input.clone()).await.unwrap();

    assert_eq!(created.title, input.title);
    assert_eq!(created.display_order, 1, "first task should get order 1");

    let retrieved = repo.get_by_id(created.id).await.unwrap();
    let retrieved = assert_some(retrieved, "task should exist");

    assert_uuid_eq(retrieved.id, created.id, "retrieved task id");
    assert_eq!(retrieved.title, created.title);
}

#[tokio::test]
async fn test_create_appends_to_end() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("append_to_end");

    let first = repo
        .create(CreateTask {
            title: builder.name("task", "first"),
        })
        .await
        .unwrap();
    let second = repo
        .create(CreateTask {
            title: builder.name("task", "second"),
        })
        .await
        .unwrap();
    let third = repo
        .create(CreateTask {
            title: builder.name("task", "third"),
        })
        .await
        .unwrap();

    assert_eq!(first.display_order, 1);
    assert_eq!(second.display_order, 2);
    assert_eq!(third.display_order, 3);
}

#[tokio::test]
async fn test_list_orders_by_display_order() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("list_order");

    let a = repo
        .create(CreateTask {
            title: builder.name("task", "a"),
        })
        .await
        .unwrap();
    let b = repo
        .create(CreateTask {
            title: builder.name("task", "b"),
        })
        .await
        .unwrap();
    let c = repo
        .create(CreateTask {
            title: builder.name("task", "c"),
        })
        .await
        .unwrap();

    // Reverse the order
    repo.reorder(vec![
        TaskRank {
            id: a.id,
            display_order: 3,
        },
        TaskRank {
            id: b.id,
            display_order: 2,
        },
        TaskRank {
            id: c.id,
            display_order: 1,
        },
    ])
    .await
    .unwrap();

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 3);
    assert_uuid_eq(listed[0].id, c.id, "first listed task");
    assert_uuid_eq(listed[1].id, b.id, "second listed task");
    assert_uuid_eq(listed[2].id, a.id, "third listed task");
}

#[tokio::test]
async fn test_reorder_unknown_id_rolls_back() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("reorder_rollback");

    let a = repo
        .create(CreateTask {
            title: builder.name("task", "a"),
        })
        .await
        .unwrap();
    let b = repo
        .create(CreateTask {
            title: builder.name("task", "b"),
        })
        .await
        .unwrap();

    // One valid update followed by an unknown id: nothing may persist
    let result = repo
        .reorder(vec![
            TaskRank {
                id: a.id,
                display_order: 10,
            },
            TaskRank {
                id: Uuid::new_v4(),
                display_order: 11,
            },
        ])
        .await;

    assert!(
        matches!(result, Err(TaskError::NotFound(_))),
        "Expected NotFound error, got {:?}",
        result
    );

    let a_after = assert_some(repo.get_by_id(a.id).await.unwrap(), "task a should exist");
    let b_after = assert_some(repo.get_by_id(b.id).await.unwrap(), "task b should exist");
    assert_eq!(a_after.display_order, 1, "task a order must be unchanged");
    assert_eq!(b_after.display_order, 2, "task b order must be unchanged");
}

#[tokio::test]
async fn test_reorder_refreshes_updated_at_only() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("reorder_timestamps");

    let a = repo
        .create(CreateTask {
            title: builder.name("task", "a"),
        })
        .await
        .unwrap();
    let b = repo
        .create(CreateTask {
            title: builder.name("task", "b"),
        })
        .await
        .unwrap();

    // Let the clock move past the insertion timestamps
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    repo.reorder(vec![
        TaskRank {
            id: a.id,
            display_order: 2,
        },
        TaskRank {
            id: b.id,
            display_order: 1,
        },
    ])
    .await
    .unwrap();

    let a_after = assert_some(repo.get_by_id(a.id).await.unwrap(), "task a should exist");
    assert_eq!(
        a_after.created_at, a.created_at,
        "reorder must not touch created_at"
    );
    assert!(
        a_after.updated_at > a.updated_at,
        "reorder must refresh updated_at"
    );
}

#[tokio::test]
async fn test_delete_task() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("delete");

    let created = repo
        .create(CreateTask {
            title: builder.name("task", "to-delete"),
        })
        .await
        .unwrap();

    // Delete should succeed
    let deleted = repo.delete(created.id).await.unwrap();
    assert!(deleted, "delete should return true");

    // Task should no longer exist
    let retrieved = repo.get_by_id(created.id).await.unwrap();
    assert!(retrieved.is_none(), "task should be deleted");

    // Second delete should return false
    let deleted_again = repo.delete(created.id).await.unwrap();
    assert!(!deleted_again, "second delete should return false");
}

#[tokio::test]
async fn test_delete_does_not_shift_other_orders() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("delete_no_shift");

    let a = repo
        .create(CreateTask {
            title: builder.name("task", "a"),
        })
        .await
        .unwrap();
    let _b = repo
        .create(CreateTask {
            title: builder.name("task", "b"),
        })
        .await
        .unwrap();
    let c = repo
        .create(CreateTask {
            title: builder.name("task", "c"),
        })
        .await
        .unwrap();

    repo.delete(a.id).await.unwrap();

    // Remaining tasks keep their orders, so the next create continues past them
    let c_after = assert_some(repo.get_by_id(c.id).await.unwrap(), "task c should exist");
    assert_eq!(c_after.display_order, 3);

    let d = repo
        .create(CreateTask {
            title: builder.name("task", "d"),
        })
        .await
        .unwrap();
    assert_eq!(d.display_order, 4);
}

// ============================================================================
// Service Tests
// ============================================================================

#[tokio::test]
async fn test_service_validation() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let service = TaskService::new(repo);

    // Test: Empty title should fail
    let result = service
        .create_task(CreateTask {
            title: "".to_string(),
        })
        .await;
    assert!(
        matches!(result, Err(TaskError::Validation(_))),
        "empty title should fail validation"
    );

    // Test: Whitespace-only title should fail
    let result = service
        .create_task(CreateTask {
            title: "   ".to_string(),
        })
        .await;
    assert!(
        matches!(result, Err(TaskError::Validation(_))),
        "whitespace-only title should fail validation"
    );

    // Test: Title too long should fail
    let result = service
        .create_task(CreateTask {
            title: "a".repeat(256),
        })
        .await;
    assert!(
        matches!(result, Err(TaskError::Validation(_))),
        "title too long should fail validation"
    );
}

#[tokio::test]
async fn test_service_delete_missing_is_not_found() {
    let db = TestDatabase::new().await;
    let repo = PgTaskRepository::new(db.connection());
    let service = TaskService::new(repo);

    let result = service.delete_task(Uuid::new_v4()).await;
    assert!(
        matches!(result, Err(TaskError::NotFound(_))),
        "deleting a missing task should be NotFound"
    );
}

// ============================================================================
// Concurrent Operations Tests
// ============================================================================

#[tokio::test]
async fn test_concurrent_creates_get_distinct_orders() {
    let db = TestDatabase::new().await;
    let builder = TestDataBuilder::from_test_name("concurrent");

    // Spawn multiple concurrent create operations
    let mut handles = vec![];
    for i in 0..5 {
        let repo_clone = PgTaskRepository::new(db.connection());
        let title = builder.name("task", &format!("concurrent-{}", i));

        let handle = tokio::spawn(async move { repo_clone.create(CreateTask { title }).await });

        handles.push(handle);
    }

    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    // All should succeed
    assert_eq!(results.len(), 5);
    for result in &results {
        assert!(result.is_ok(), "concurrent create should succeed");
    }

    // The advisory lock serializes the creates, so the slots come out dense
    let mut orders: Vec<i32> = results
        .into_iter()
        .map(|r| r.unwrap().display_order)
        .collect();
    orders.sort_unstable();
    assert_eq!(
        orders,
        vec![1, 2, 3, 4, 5],
        "each create must claim its own slot"
    );

    let repo = PgTaskRepository::new(db.connection());
    assert_eq!(repo.count().await.unwrap(), 5, "all tasks should be created");
}
