use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Custom validator rejecting titles that are empty after trimming
fn validate_title_not_blank(title: &str) -> Result<(), validator::ValidationError> {
    if title.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_title"));
    }
    Ok(())
}

/// Task entity - represents a single entry on the list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, TS)]
#[ts(export)]
pub struct Task {
    /// Unique identifier
    #[ts(as = "String")]
    pub id: Uuid,
    /// Task title
    pub title: String,
    /// Position of the task in the list (ascending)
    pub display_order: i32,
    /// Creation timestamp
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new task
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct CreateTask {
    #[validate(
        length(min = 1, max = 255),
        custom(function = "validate_title_not_blank")
    )]
    pub title: String,
}

/// A single (task id, position) pair within a reorder request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct TaskRank {
    #[ts(as = "String")]
    pub id: Uuid,
    pub display_order: i32,
}

/// DTO for reordering tasks
///
/// Carries the full new ordering produced by the client. An empty list
/// is accepted and leaves the table untouched.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema, TS)]
#[ts(export)]
pub struct ReorderTasks {
    #[validate(nested)]
    pub tasks: Vec<TaskRank>,
}

impl Task {
    /// Create a new task with the given title and position.
    pub fn new(title: String, display_order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title,
            display_order,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_accepts_valid_title() {
        let input = CreateTask {
            title: "Buy milk".to_string(),
        };
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_create_task_rejects_empty_title() {
        let input = CreateTask {
            title: String::new(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_task_rejects_whitespace_only_title() {
        let input = CreateTask {
            title: "   ".to_string(),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_create_task_rejects_overlong_title() {
        let input = CreateTask {
            title: "a".repeat(256),
        };
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_reorder_tasks_accepts_empty_list() {
        let input = ReorderTasks { tasks: vec![] };
        assert!(input.validate().is_ok());
    }
}
