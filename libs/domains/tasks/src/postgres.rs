use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionError, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    entity,
    error::{TaskError, TaskResult},
    models::{CreateTask, Task, TaskRank},
    repository::TaskRepository,
};

/// Advisory lock key guarding display_order allocation. Competing creates
/// queue on this lock for the duration of their transaction.
const DISPLAY_ORDER_LOCK: i64 = 0x7461_736b; // "task"

pub struct PgTaskRepository {
    base: BaseRepository<entity::Entity>,
}

impl PgTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

/// Collapse the two-layer transaction error into the domain error.
fn unwrap_txn_error(err: TransactionError<TaskError>) -> TaskError {
    match err {
        TransactionError::Connection(e) => e.into(),
        TransactionError::Transaction(e) => e,
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let model = self
            .base
            .db()
            .transaction::<_, entity::Model, TaskError>(|txn| {
                Box::pin(async move {
                    // pg_advisory_xact_lock serializes the max read against
                    // other creates; without it two transactions at READ
                    // COMMITTED can both see the same max and insert
                    // duplicate positions. Released on commit or rollback.
                    txn.execute_unprepared(&format!(
                        "SELECT pg_advisory_xact_lock({DISPLAY_ORDER_LOCK})"
                    ))
                    .await?;

                    let max_order = entity::Entity::find()
                        .order_by_desc(entity::Column::DisplayOrder)
                        .one(txn)
                        .await?
                        .map(|m| m.display_order)
                        .unwrap_or(0);

                    let now: DateTimeWithTimeZone = chrono::Utc::now().into();
                    let active = entity::ActiveModel {
                        id: Set(Uuid::now_v7()),
                        title: Set(input.title),
                        display_order: Set(max_order + 1),
                        created_at: Set(now),
                        updated_at: Set(now),
                    };

                    Ok(active.insert(txn).await?)
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        tracing::info!(task_id = %model.id, display_order = model.display_order, "Created task");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: Uuid) -> TaskResult<Option<Task>> {
        let model = self.base.find_by_id(id).await?;
        Ok(model.map(|m| m.into()))
    }

    async fn list(&self) -> TaskResult<Vec<Task>> {
        let models = entity::Entity::find()
            .order_by_asc(entity::Column::DisplayOrder)
            .all(self.base.db())
            .await?;

        Ok(models.into_iter().map(|m| m.into()).collect())
    }

    async fn reorder(&self, ranks: Vec<TaskRank>) -> TaskResult<()> {
        let count = ranks.len();

        self.base
            .db()
            .transaction::<_, (), TaskError>(|txn| {
                Box::pin(async move {
                    let now: DateTimeWithTimeZone = chrono::Utc::now().into();

                    for rank in ranks {
                        let result = entity::Entity::update_many()
                            .col_expr(
                                entity::Column::DisplayOrder,
                                Expr::value(rank.display_order),
                            )
                            .col_expr(entity::Column::UpdatedAt, Expr::value(now))
                            .filter(entity::Column::Id.eq(rank.id))
                            .exec(txn)
                            .await?;

                        // An unknown id rolls back the whole batch
                        if result.rows_affected != 1 {
                            return Err(TaskError::NotFound(rank.id));
                        }
                    }

                    Ok(())
                })
            })
            .await
            .map_err(unwrap_txn_error)?;

        tracing::info!(task_count = count, "Reordered tasks");
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> TaskResult<bool> {
        let rows_affected = self.base.delete_by_id(id).await?;

        if rows_affected > 0 {
            tracing::info!(task_id = %id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn count(&self) -> TaskResult<usize> {
        let count = entity::Entity::find().count(self.base.db()).await?;
        Ok(count as usize)
    }
}
