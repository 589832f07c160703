use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskRank};

/// Repository trait for Task persistence
///
/// This trait defines the data access interface for tasks.
/// Implementations can use different storage backends (PostgreSQL, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Create a new task, placing it at the end of the list
    async fn create(&self, input: CreateTask) -> TaskResult<Task>;

    /// Get a task by ID
    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>>;

    /// List all tasks ordered by display_order ascending
    async fn list(&self) -> TaskResult<Vec<Task>>;

    /// Apply a new ordering atomically; fails if any id is unknown
    async fn reorder(&self, ranks: Vec<TaskRank>) -> TaskResult<()>;

    /// Delete a task by ID
    async fn delete(&self, id: Uuid) -> TaskResult<bool>;

    /// Count all tasks
    async fn count(&self) -> TaskResult<usize>;
}

/// In-memory implementation of TaskRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryTaskRepository {
    tasks: Arc<RwLock<HashMap<Uuid, Task>>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let mut tasks = self.tasks.write().await;

        let max_order = tasks.values().map(|t| t.display_order).max().unwrap_or(0);
        let task = Task::new(input.title, max_order + 1);
        tasks.insert(task.id, task.clone());

        tracing::info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&id).cloned())
    }

    async fn list(&self) -> TaskResult<Vec<Task>> {
        let tasks = self.tasks.read().await;

        let mut result: Vec<Task> = tasks.values().cloned().collect();
        result.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.created_at.cmp(&b.created_at))
        });

        Ok(result)
    }

    async fn reorder(&self, ranks: Vec<TaskRank>) -> TaskResult<()> {
        let mut tasks = self.tasks.write().await;

        // Reject the whole batch before touching anything
        for rank in &ranks {
            if !tasks.contains_key(&rank.id) {
                return Err(TaskError::NotFound(rank.id));
            }
        }

        let now = chrono::Utc::now();
        for rank in ranks {
            if let Some(task) = tasks.get_mut(&rank.id) {
                task.display_order = rank.display_order;
                task.updated_at = now;
            }
        }

        tracing::info!("Reordered tasks");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let mut tasks = self.tasks.write().await;

        if tasks.remove(&id).is_some() {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> TaskResult<usize> {
        let tasks = self.tasks.read().await;
        Ok(tasks.len())
    }
}
