//! Block entity model, DTOs, and engine result payloads.

use nightshift_core::task_ledger::BlockProgress;
use nightshift_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::task::Task;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `blocks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Block {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    /// Queue position, `1..=15`. Not unique; ties are ordered by `id`.
    pub block_number: i32,
    pub day_number: i32,
    pub category_id: Option<DbId>,
    pub last_completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A block together with its tasks in render order.
#[derive(Debug, Clone, Serialize)]
pub struct BlockWithTasks {
    pub block: Block,
    pub tasks: Vec<Task>,
    pub task_count: usize,
    pub completed_tasks: usize,
}

impl BlockWithTasks {
    pub fn new(block: Block, tasks: Vec<Task>) -> Self {
        let completed_tasks = tasks.iter().filter(|t| t.completed).count();
        Self {
            block,
            task_count: tasks.len(),
            completed_tasks,
            tasks,
        }
    }
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating a new block.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBlock {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    pub day_number: i32,
    pub category_id: Option<DbId>,
    /// Auto-assigned from the queue when omitted.
    pub block_number: Option<i32>,
}

/// DTO for updating an existing block. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBlock {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    pub day_number: Option<i32>,
    pub category_id: Option<DbId>,
    pub block_number: Option<i32>,
}

/// One entry of a bulk block renumbering.
#[derive(Debug, Clone, Deserialize)]
pub struct BlockOrderEntry {
    pub block_id: DbId,
    pub block_number: i32,
}

/// Sort key for block listings.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BlockOrder {
    #[default]
    BlockNumber,
    CreatedAt,
}

/// Query parameters for `GET /api/v1/blocks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockListParams {
    pub day_number: Option<i32>,
    #[serde(default)]
    pub order_by: BlockOrder,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Query parameters for `GET /api/v1/blocks/active`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActiveBlockParams {
    pub day_number: Option<i32>,
}

/// Query parameters for `POST /api/v1/blocks/{id}/complete-and-reset`.
#[derive(Debug, Clone, Deserialize)]
pub struct CompleteAndResetParams {
    #[serde(default = "default_true")]
    pub move_to_end: bool,
}

/// Query parameters for `POST /api/v1/blocks/{id}/clone`.
#[derive(Debug, Clone, Deserialize)]
pub struct CloneBlockParams {
    #[serde(default = "default_true")]
    pub copy_tasks: bool,
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Engine results
// ---------------------------------------------------------------------------

/// Result of one complete-and-reset cycle.
#[derive(Debug, Clone, Serialize)]
pub struct CompleteAndResetResult {
    pub block_id: DbId,
    pub block_title: String,
    pub tasks_completed: usize,
    pub tasks_reset: usize,
    pub new_block_number: i32,
    pub moved_to_end: bool,
}

/// Result of resetting a block's tasks without requeueing it.
#[derive(Debug, Clone, Serialize)]
pub struct ResetTasksResult {
    pub block_id: DbId,
    pub tasks_reset: usize,
}

/// The next block to work on, or an explanatory message when the queue has
/// no block with tasks.
#[derive(Debug, Clone, Serialize)]
pub struct NextBlock {
    pub block: Option<Block>,
    pub progress: Option<BlockProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl NextBlock {
    pub fn found(block: Block, progress: BlockProgress) -> Self {
        Self {
            block: Some(block),
            progress: Some(progress),
            message: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            block: None,
            progress: None,
            message: Some("No blocks available"),
        }
    }
}
