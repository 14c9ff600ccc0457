//! Repository for the `tasks` table.

use chrono::Utc;
use nightshift_core::category::resolve_task_category;
use nightshift_core::error::CoreError;
use nightshift_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use nightshift_core::task_ledger::{
    validate_position, BlockProgress, ProgressCounts, TaskCompletion,
};
use nightshift_core::types::{DbId, Timestamp};
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::task::{
    BulkItemStatus, BulkTaskResult, CreateTask, Task, TaskListParams, TaskPositionEntry,
    UpdateTask,
};
use crate::models::ReorderResult;

/// Column list for tasks queries.
const COLUMNS: &str = "id, block_id, category_id, title, description, estimated_minutes, \
    actual_minutes, completed, completed_at, position, created_at, updated_at";

/// Render order within a block.
const RENDER_ORDER: &str = "position ASC, id ASC";

/// Provides CRUD operations and completion transitions for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task under an existing block.
    ///
    /// The category is inherited from the block; a conflicting explicit
    /// category or a category-less block is a validation error. Without an
    /// explicit position the task is appended after the block's last one.
    pub async fn create(pool: &PgPool, input: &CreateTask) -> Result<Task, RepoError> {
        let mut tx = pool.begin().await?;

        let block_category = lock_block_category(&mut tx, input.block_id).await?;
        let category_id = resolve_task_category(block_category, input.category_id).into_result()?;

        let position = match input.position {
            Some(position) => position,
            None => {
                let (next,): (i32,) = sqlx::query_as(
                    "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE block_id = $1",
                )
                .bind(input.block_id)
                .fetch_one(&mut *tx)
                .await?;
                next
            }
        };

        let query = format!(
            "INSERT INTO tasks \
                (block_id, category_id, title, description, estimated_minutes, position) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(input.block_id)
            .bind(category_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.estimated_minutes)
            .bind(position)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Find a task by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tasks with optional filters.
    pub async fn list(pool: &PgPool, params: &TaskListParams) -> Result<Vec<Task>, sqlx::Error> {
        let limit_val = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset_val = clamp_offset(params.offset);

        let query = format!(
            "SELECT {COLUMNS} FROM tasks \
             WHERE ($1::BOOLEAN IS NULL OR completed = $1) \
               AND ($2::BIGINT IS NULL OR block_id = $2) \
               AND ($3::BIGINT IS NULL OR category_id = $3) \
             ORDER BY block_id ASC, {RENDER_ORDER} \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(params.completed)
            .bind(params.block_id)
            .bind(params.category_id)
            .bind(limit_val)
            .bind(offset_val)
            .fetch_all(pool)
            .await
    }

    /// All tasks of a block in render order.
    pub async fn list_by_block(pool: &PgPool, block_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE block_id = $1 ORDER BY {RENDER_ORDER}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(block_id)
            .fetch_all(pool)
            .await
    }

    /// All tasks carrying a category.
    pub async fn list_by_category(
        pool: &PgPool,
        category_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM tasks WHERE category_id = $1 \
             ORDER BY block_id ASC, {RENDER_ORDER}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(category_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task. Returns `None` if no row has the given id.
    ///
    /// Changing `block_id` or `category_id` re-resolves the category against
    /// the target block. Toggling `completed` follows the same timestamp
    /// rules as [`TaskRepo::complete`] and [`TaskRepo::uncomplete`].
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, RepoError> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = $1 FOR UPDATE");
        let Some(current) = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let block_id = input.block_id.unwrap_or(current.block_id);
        let category_id = if input.block_id.is_some() || input.category_id.is_some() {
            let block_category = lock_block_category(&mut tx, block_id).await?;
            resolve_task_category(block_category, input.category_id).into_result()?
        } else {
            current.category_id
        };

        let mut completion = TaskCompletion {
            task_id: current.id,
            completed: current.completed,
            completed_at: current.completed_at,
            actual_minutes: current.actual_minutes,
        };
        match input.completed {
            Some(true) => {
                completion.mark_complete(Utc::now());
            }
            Some(false) => {
                completion.mark_incomplete();
            }
            None => {}
        }
        if input.actual_minutes.is_some() {
            completion.actual_minutes = input.actual_minutes;
        }

        let query = format!(
            "UPDATE tasks SET \
                block_id          = $1, \
                category_id       = $2, \
                title             = COALESCE($3, title), \
                description       = COALESCE($4, description), \
                estimated_minutes = COALESCE($5, estimated_minutes), \
                actual_minutes    = $6, \
                completed         = $7, \
                completed_at      = $8, \
                position          = COALESCE($9, position) \
             WHERE id = $10 \
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(block_id)
            .bind(category_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.estimated_minutes)
            .bind(completion.actual_minutes)
            .bind(completion.completed)
            .bind(completion.completed_at)
            .bind(input.position)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(task))
    }

    /// Delete a task. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Mark a task complete. `completed_at` is only stamped on the
    /// transition; `actual_minutes` is replaced when supplied.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        actual_minutes: Option<i32>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET \
                completed      = true, \
                completed_at   = CASE WHEN completed THEN completed_at ELSE NOW() END, \
                actual_minutes = COALESCE($1, actual_minutes) \
             WHERE id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(actual_minutes)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Mark a task incomplete. Recorded `actual_minutes` are kept.
    pub async fn uncomplete(pool: &PgPool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!(
            "UPDATE tasks SET completed = false, completed_at = NULL \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Complete each listed task, continuing past ids that do not exist.
    pub async fn bulk_complete(pool: &PgPool, ids: &[DbId]) -> Result<BulkTaskResult, sqlx::Error> {
        let mut result = BulkTaskResult::default();
        for &id in ids {
            let status = match Self::complete(pool, id, None).await? {
                Some(_) => BulkItemStatus::Ok,
                None => BulkItemStatus::NotFound,
            };
            result.record(id, status);
        }
        Ok(result)
    }

    /// Uncomplete each listed task, continuing past ids that do not exist.
    pub async fn bulk_uncomplete(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<BulkTaskResult, sqlx::Error> {
        let mut result = BulkTaskResult::default();
        for &id in ids {
            let status = match Self::uncomplete(pool, id).await? {
                Some(_) => BulkItemStatus::Ok,
                None => BulkItemStatus::NotFound,
            };
            result.record(id, status);
        }
        Ok(result)
    }

    /// Rewrite task positions in bulk. Unknown ids are skipped and reported.
    pub async fn reorder(
        pool: &PgPool,
        entries: &[TaskPositionEntry],
    ) -> Result<ReorderResult, RepoError> {
        for entry in entries {
            validate_position(entry.position)?;
        }

        let mut tx = pool.begin().await?;
        let mut result = ReorderResult::default();
        for entry in entries {
            let updated = sqlx::query("UPDATE tasks SET position = $1 WHERE id = $2")
                .bind(entry.position)
                .bind(entry.task_id)
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() > 0 {
                result.updated.push(entry.task_id);
            } else {
                result.missing.push(entry.task_id);
            }
        }

        tx.commit().await?;
        Ok(result)
    }

    // -----------------------------------------------------------------------
    // Progress
    // -----------------------------------------------------------------------

    /// Live progress for a block. A block without tasks reports zero.
    pub async fn block_progress(pool: &PgPool, block_id: DbId) -> Result<BlockProgress, sqlx::Error> {
        let (total_tasks, completed_tasks, total_estimated, total_actual, remaining): (
            i64,
            i64,
            i64,
            i64,
            i64,
        ) = sqlx::query_as(
            "SELECT \
                COUNT(*), \
                COUNT(*) FILTER (WHERE completed), \
                COALESCE(SUM(estimated_minutes), 0)::BIGINT, \
                COALESCE(SUM(actual_minutes), 0)::BIGINT, \
                COALESCE(SUM(estimated_minutes) FILTER (WHERE NOT completed), 0)::BIGINT \
             FROM tasks WHERE block_id = $1",
        )
        .bind(block_id)
        .fetch_one(pool)
        .await?;

        Ok(BlockProgress::from_counts(
            block_id,
            ProgressCounts {
                total_tasks,
                completed_tasks,
                total_estimated_minutes: total_estimated,
                total_actual_minutes: total_actual,
                remaining_estimated_minutes: remaining,
            },
        ))
    }

    // -----------------------------------------------------------------------
    // Snapshots for block-level transitions
    // -----------------------------------------------------------------------

    /// Lock and load the completion state of every task in a block.
    pub(crate) async fn load_completion_snapshots(
        conn: &mut PgConnection,
        block_id: DbId,
    ) -> Result<Vec<TaskCompletion>, sqlx::Error> {
        let rows: Vec<(DbId, bool, Option<Timestamp>, Option<i32>)> = sqlx::query_as(
            "SELECT id, completed, completed_at, actual_minutes FROM tasks \
             WHERE block_id = $1 \
             ORDER BY position ASC, id ASC \
             FOR UPDATE",
        )
        .bind(block_id)
        .fetch_all(conn)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(task_id, completed, completed_at, actual_minutes)| TaskCompletion {
                task_id,
                completed,
                completed_at,
                actual_minutes,
            })
            .collect())
    }

    /// Persist completion snapshots in a single statement.
    pub(crate) async fn write_completion_snapshots(
        conn: &mut PgConnection,
        tasks: &[TaskCompletion],
    ) -> Result<(), sqlx::Error> {
        if tasks.is_empty() {
            return Ok(());
        }

        let ids: Vec<DbId> = tasks.iter().map(|t| t.task_id).collect();
        let completed: Vec<bool> = tasks.iter().map(|t| t.completed).collect();
        let completed_at: Vec<Option<Timestamp>> = tasks.iter().map(|t| t.completed_at).collect();
        let actual_minutes: Vec<Option<i32>> = tasks.iter().map(|t| t.actual_minutes).collect();

        sqlx::query(
            "UPDATE tasks AS t SET \
                completed      = u.completed, \
                completed_at   = u.completed_at, \
                actual_minutes = u.actual_minutes \
             FROM UNNEST($1::BIGINT[], $2::BOOLEAN[], $3::TIMESTAMPTZ[], $4::INT[]) \
                AS u(id, completed, completed_at, actual_minutes) \
             WHERE t.id = u.id",
        )
        .bind(&ids)
        .bind(&completed)
        .bind(&completed_at)
        .bind(&actual_minutes)
        .execute(conn)
        .await?;
        Ok(())
    }
}

/// Share-lock a block and return its category. Missing blocks are `NotFound`.
async fn lock_block_category(
    conn: &mut PgConnection,
    block_id: DbId,
) -> Result<Option<DbId>, RepoError> {
    let row: Option<(Option<DbId>,)> =
        sqlx::query_as("SELECT category_id FROM blocks WHERE id = $1 FOR SHARE")
            .bind(block_id)
            .fetch_optional(conn)
            .await?;
    match row {
        Some((category_id,)) => Ok(category_id),
        None => Err(CoreError::NotFound {
            entity: "Block",
            id: block_id,
        }
        .into()),
    }
}
