//! Repository for the `blocks` table and the queue engine transitions.
//!
//! Every operation that derives a block number from `MAX(block_number)`
//! takes the transaction-scoped queue advisory lock first, so two concurrent
//! requests can never both compute the same "next" slot.

use chrono::Utc;
use nightshift_core::block_queue::{
    assign_block_number, validate_day_number, BlockNumber, QUEUE_LOCK_ID,
};
use nightshift_core::error::CoreError;
use nightshift_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use nightshift_core::task_ledger::{cycle_block, reset_all};
use nightshift_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::error::RepoError;
use crate::models::block::{
    Block, BlockListParams, BlockOrder, BlockOrderEntry, BlockWithTasks, CompleteAndResetResult,
    CreateBlock, NextBlock, ResetTasksResult, UpdateBlock,
};
use crate::models::ReorderResult;
use crate::repositories::TaskRepo;

/// Column list for blocks queries.
const COLUMNS: &str = "id, title, description, block_number, day_number, category_id, \
    last_completed_at, created_at, updated_at";

/// Provides CRUD operations and queue transitions for blocks.
pub struct BlockRepo;

impl BlockRepo {
    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Insert a new block.
    ///
    /// An explicit `block_number` must be in range and unoccupied. Without
    /// one, the next free slot after the current maximum is assigned.
    pub async fn create(pool: &PgPool, input: &CreateBlock) -> Result<Block, RepoError> {
        validate_day_number(input.day_number)?;

        let mut tx = pool.begin().await?;
        lock_queue(&mut tx).await?;

        if let Some(category_id) = input.category_id {
            ensure_category_exists(&mut tx, category_id).await?;
        }

        let block_number = match input.block_number {
            Some(requested) => {
                let number = BlockNumber::new(requested)?;
                if number_held_by_other(&mut tx, number, None).await? {
                    return Err(CoreError::Conflict(format!(
                        "block_number {number} is already in use"
                    ))
                    .into());
                }
                number
            }
            None => next_free_number(&mut tx).await?,
        };

        let query = format!(
            "INSERT INTO blocks (title, description, block_number, day_number, category_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let block = sqlx::query_as::<_, Block>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(block_number.get())
            .bind(input.day_number)
            .bind(input.category_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(block)
    }

    /// Find a block by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Block>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blocks WHERE id = $1");
        sqlx::query_as::<_, Block>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List blocks, optionally filtered by day.
    pub async fn list(pool: &PgPool, params: &BlockListParams) -> Result<Vec<Block>, sqlx::Error> {
        let limit_val = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset_val = clamp_offset(params.offset);
        let order = match params.order_by {
            BlockOrder::BlockNumber => "block_number ASC, id ASC",
            BlockOrder::CreatedAt => "created_at ASC, id ASC",
        };

        let query = format!(
            "SELECT {COLUMNS} FROM blocks \
             WHERE ($1::INT IS NULL OR day_number = $1) \
             ORDER BY {order} \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Block>(&query)
            .bind(params.day_number)
            .bind(limit_val)
            .bind(offset_val)
            .fetch_all(pool)
            .await
    }

    /// Blocks with at least one incomplete task, in queue order.
    pub async fn list_active(
        pool: &PgPool,
        day_number: Option<i32>,
    ) -> Result<Vec<Block>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blocks b \
             WHERE ($1::INT IS NULL OR b.day_number = $1) \
               AND EXISTS (SELECT 1 FROM tasks t WHERE t.block_id = b.id AND NOT t.completed) \
             ORDER BY b.block_number ASC, b.id ASC"
        );
        sqlx::query_as::<_, Block>(&query)
            .bind(day_number)
            .fetch_all(pool)
            .await
    }

    /// A block with its tasks in render order.
    pub async fn find_with_tasks(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<BlockWithTasks>, sqlx::Error> {
        let Some(block) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let tasks = TaskRepo::list_by_block(pool, id).await?;
        Ok(Some(BlockWithTasks::new(block, tasks)))
    }

    /// Update a block. Returns `None` if no row has the given id.
    ///
    /// Moving to an occupied `block_number` is a conflict. The category may
    /// only change while no task under the block carries a different one.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBlock,
    ) -> Result<Option<Block>, RepoError> {
        if let Some(day_number) = input.day_number {
            validate_day_number(day_number)?;
        }
        let block_number = input.block_number.map(BlockNumber::new).transpose()?;

        let mut tx = pool.begin().await?;
        if block_number.is_some() {
            lock_queue(&mut tx).await?;
        }

        let Some(current) = lock_block(&mut tx, id).await? else {
            return Ok(None);
        };

        if let Some(number) = block_number {
            if number.get() != current.block_number
                && number_held_by_other(&mut tx, number, Some(id)).await?
            {
                return Err(CoreError::Conflict(format!(
                    "block_number {number} is already in use"
                ))
                .into());
            }
        }

        if let Some(category_id) = input.category_id {
            if current.category_id != Some(category_id) {
                ensure_category_exists(&mut tx, category_id).await?;
                let (mismatched,): (i64,) = sqlx::query_as(
                    "SELECT COUNT(*) FROM tasks WHERE block_id = $1 AND category_id <> $2",
                )
                .bind(id)
                .bind(category_id)
                .fetch_one(&mut *tx)
                .await?;
                if mismatched > 0 {
                    return Err(CoreError::Validation(format!(
                        "category_id: block has {mismatched} task(s) in another category"
                    ))
                    .into());
                }
            }
        }

        let query = format!(
            "UPDATE blocks SET \
                title        = COALESCE($1, title), \
                description  = COALESCE($2, description), \
                day_number   = COALESCE($3, day_number), \
                category_id  = COALESCE($4, category_id), \
                block_number = COALESCE($5, block_number) \
             WHERE id = $6 \
             RETURNING {COLUMNS}"
        );
        let block = sqlx::query_as::<_, Block>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.day_number)
            .bind(input.category_id)
            .bind(block_number.map(BlockNumber::get))
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(block))
    }

    /// Delete a block and, by cascade, its tasks. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blocks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Queue transitions
    // -----------------------------------------------------------------------

    /// Requeue a block one past the current maximum, wrapping `15 -> 1`.
    ///
    /// Wrapping onto an occupied slot is allowed; ties sort by `id`.
    pub async fn move_to_end(pool: &PgPool, id: DbId) -> Result<Option<Block>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        lock_queue(&mut tx).await?;

        if lock_block(&mut tx, id).await?.is_none() {
            return Ok(None);
        }
        let new_number = BlockNumber::next_after(current_max(&mut tx).await?);

        let query = format!("UPDATE blocks SET block_number = $1 WHERE id = $2 RETURNING {COLUMNS}");
        let block = sqlx::query_as::<_, Block>(&query)
            .bind(new_number.get())
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(block))
    }

    /// Complete every open task, reset every task, and optionally requeue
    /// the block, all in one transaction. Returns `None` if the block does
    /// not exist.
    pub async fn complete_and_reset(
        pool: &PgPool,
        id: DbId,
        move_to_end: bool,
    ) -> Result<Option<CompleteAndResetResult>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if move_to_end {
            lock_queue(&mut tx).await?;
        }

        let Some(block) = lock_block(&mut tx, id).await? else {
            return Ok(None);
        };

        let now = Utc::now();
        let mut tasks = TaskRepo::load_completion_snapshots(&mut tx, id).await?;
        let outcome = cycle_block(&mut tasks, now);
        TaskRepo::write_completion_snapshots(&mut tx, &tasks).await?;

        let new_block_number = if move_to_end {
            BlockNumber::next_after(current_max(&mut tx).await?).get()
        } else {
            block.block_number
        };

        sqlx::query("UPDATE blocks SET block_number = $1, last_completed_at = $2 WHERE id = $3")
            .bind(new_block_number)
            .bind(now)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(CompleteAndResetResult {
            block_id: block.id,
            block_title: block.title,
            tasks_completed: outcome.tasks_completed,
            tasks_reset: outcome.tasks_reset,
            new_block_number,
            moved_to_end: move_to_end,
        }))
    }

    /// Mark every task of a block incomplete without requeueing it.
    pub async fn reset_tasks(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ResetTasksResult>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        if lock_block(&mut tx, id).await?.is_none() {
            return Ok(None);
        }

        let mut tasks = TaskRepo::load_completion_snapshots(&mut tx, id).await?;
        let tasks_reset = reset_all(&mut tasks);
        TaskRepo::write_completion_snapshots(&mut tx, &tasks).await?;

        tx.commit().await?;
        Ok(Some(ResetTasksResult {
            block_id: id,
            tasks_reset,
        }))
    }

    /// The first block in queue order that has at least one task.
    pub async fn find_next(pool: &PgPool) -> Result<NextBlock, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM blocks b \
             WHERE EXISTS (SELECT 1 FROM tasks t WHERE t.block_id = b.id) \
             ORDER BY b.block_number ASC, b.id ASC \
             LIMIT 1"
        );
        let block = sqlx::query_as::<_, Block>(&query)
            .fetch_optional(pool)
            .await?;

        match block {
            Some(block) => {
                let progress = TaskRepo::block_progress(pool, block.id).await?;
                Ok(NextBlock::found(block, progress))
            }
            None => Ok(NextBlock::empty()),
        }
    }

    /// Duplicate a block into a fresh queue slot, optionally with its tasks.
    ///
    /// Copied tasks start incomplete with no recorded time.
    pub async fn clone_block(
        pool: &PgPool,
        id: DbId,
        copy_tasks: bool,
    ) -> Result<Option<Block>, RepoError> {
        let mut tx = pool.begin().await?;
        lock_queue(&mut tx).await?;

        let query = format!("SELECT {COLUMNS} FROM blocks WHERE id = $1 FOR SHARE");
        let Some(source) = sqlx::query_as::<_, Block>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let block_number = next_free_number(&mut tx).await?;

        let query = format!(
            "INSERT INTO blocks (title, description, block_number, day_number, category_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        let clone = sqlx::query_as::<_, Block>(&query)
            .bind(&source.title)
            .bind(&source.description)
            .bind(block_number.get())
            .bind(source.day_number)
            .bind(source.category_id)
            .fetch_one(&mut *tx)
            .await?;

        if copy_tasks {
            sqlx::query(
                "INSERT INTO tasks \
                    (block_id, category_id, title, description, estimated_minutes, position) \
                 SELECT $1, category_id, title, description, estimated_minutes, position \
                 FROM tasks WHERE block_id = $2 \
                 ORDER BY position ASC, id ASC",
            )
            .bind(clone.id)
            .bind(source.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Some(clone))
    }

    /// Rewrite block numbers in bulk. Unknown ids are skipped and reported.
    pub async fn reorder(
        pool: &PgPool,
        entries: &[BlockOrderEntry],
    ) -> Result<ReorderResult, RepoError> {
        for entry in entries {
            BlockNumber::new(entry.block_number)?;
        }

        let mut tx = pool.begin().await?;
        lock_queue(&mut tx).await?;

        let mut result = ReorderResult::default();
        for entry in entries {
            let updated = sqlx::query("UPDATE blocks SET block_number = $1 WHERE id = $2")
                .bind(entry.block_number)
                .bind(entry.block_id)
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() > 0 {
                result.updated.push(entry.block_id);
            } else {
                result.missing.push(entry.block_id);
            }
        }

        tx.commit().await?;
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Transaction helpers
// ---------------------------------------------------------------------------

/// Take the queue advisory lock, released when the transaction ends.
async fn lock_queue(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(QUEUE_LOCK_ID)
        .execute(conn)
        .await?;
    Ok(())
}

async fn lock_block(conn: &mut PgConnection, id: DbId) -> Result<Option<Block>, sqlx::Error> {
    let query = format!("SELECT {COLUMNS} FROM blocks WHERE id = $1 FOR UPDATE");
    sqlx::query_as::<_, Block>(&query)
        .bind(id)
        .fetch_optional(conn)
        .await
}

async fn current_max(conn: &mut PgConnection) -> Result<Option<i32>, sqlx::Error> {
    let (max,): (Option<i32>,) = sqlx::query_as("SELECT MAX(block_number) FROM blocks")
        .fetch_one(conn)
        .await?;
    Ok(max)
}

async fn next_free_number(conn: &mut PgConnection) -> Result<BlockNumber, RepoError> {
    let max = current_max(&mut *conn).await?;
    let occupied: Vec<i32> = sqlx::query_scalar("SELECT DISTINCT block_number FROM blocks")
        .fetch_all(&mut *conn)
        .await?;
    Ok(assign_block_number(max, &occupied)?)
}

async fn number_held_by_other(
    conn: &mut PgConnection,
    number: BlockNumber,
    exclude: Option<DbId>,
) -> Result<bool, sqlx::Error> {
    let (held,): (bool,) = sqlx::query_as(
        "SELECT EXISTS (\
            SELECT 1 FROM blocks \
            WHERE block_number = $1 AND ($2::BIGINT IS NULL OR id <> $2))",
    )
    .bind(number.get())
    .bind(exclude)
    .fetch_one(conn)
    .await?;
    Ok(held)
}

async fn ensure_category_exists(conn: &mut PgConnection, id: DbId) -> Result<(), RepoError> {
    let found: Option<(DbId,)> = sqlx::query_as("SELECT id FROM categories WHERE id = $1")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "Category",
            id,
        }
        .into()),
    }
}
