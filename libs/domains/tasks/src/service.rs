use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, ReorderTasks, Task};
use crate::repository::TaskRepository;

/// Service layer for Task business logic
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new task with validation
    ///
    /// The title is trimmed before storage; a title that is empty after
    /// trimming is rejected by validation.
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, input: CreateTask) -> TaskResult<Task> {
        // Validate input
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        let input = CreateTask {
            title: input.title.trim().to_string(),
        };

        self.repository.create(input).await
    }

    /// Get a task by ID
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn get_task(&self, id: Uuid) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// List all tasks in display order
    pub async fn list_tasks(&self) -> TaskResult<Vec<Task>> {
        self.repository.list().await
    }

    /// Reorder tasks atomically
    ///
    /// Applies the full new ordering in a single transaction. An empty
    /// request succeeds without touching storage.
    #[instrument(skip(self, input), fields(task_count = input.tasks.len()))]
    pub async fn reorder_tasks(&self, input: ReorderTasks) -> TaskResult<()> {
        input
            .validate()
            .map_err(|e| TaskError::Validation(e.to_string()))?;

        if input.tasks.is_empty() {
            return Ok(());
        }

        self.repository.reorder(input.tasks).await
    }

    /// Delete a task
    #[instrument(skip(self), fields(task_id = %id))]
    pub async fn delete_task(&self, id: Uuid) -> TaskResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }

    /// Count all tasks
    pub async fn count_tasks(&self) -> TaskResult<usize> {
        self.repository.count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskRank;
    use crate::repository::MockTaskRepository;

    #[tokio::test]
    async fn test_create_task_rejects_blank_title() {
        let mock_repo = MockTaskRepository::new();
        let service = TaskService::new(mock_repo);

        let result = service
            .create_task(CreateTask {
                title: "   ".to_string(),
            })
            .await;

        assert!(matches!(result, Err(TaskError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_task_trims_title() {
        let mut mock_repo = MockTaskRepository::new();

        mock_repo
            .expect_create()
            .withf(|input| input.title == "trimmed")
            .returning(|input| Ok(Task::new(input.title, 1)));

        let service = TaskService::new(mock_repo);
        let task = service
            .create_task(CreateTask {
                title: "  trimmed  ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(task.title, "trimmed");
    }

    #[tokio::test]
    async fn test_get_task_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_get_by_id()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(None));

        let service = TaskService::new(mock_repo);
        let result = service.get_task(id).await;

        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reorder_empty_list_skips_repository() {
        // No expectation set on reorder: calling it would panic the mock
        let mock_repo = MockTaskRepository::new();
        let service = TaskService::new(mock_repo);

        let result = service.reorder_tasks(ReorderTasks { tasks: vec![] }).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_reorder_passes_ranks_through() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_reorder()
            .withf(move |ranks| ranks.len() == 1 && ranks[0].id == id)
            .returning(|_| Ok(()));

        let service = TaskService::new(mock_repo);
        let result = service
            .reorder_tasks(ReorderTasks {
                tasks: vec![TaskRank {
                    id,
                    display_order: 3,
                }],
            })
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_task_not_found() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_delete()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(false));

        let service = TaskService::new(mock_repo);
        let result = service.delete_task(id).await;

        assert!(matches!(result, Err(TaskError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_task_success() {
        let mut mock_repo = MockTaskRepository::new();
        let id = Uuid::now_v7();

        mock_repo
            .expect_delete()
            .with(mockall::predicate::eq(id))
            .returning(|_| Ok(true));

        let service = TaskService::new(mock_repo);
        assert!(service.delete_task(id).await.is_ok());
    }
}
