//! Task entity model and DTOs.

use std::collections::BTreeMap;

use nightshift_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub block_id: DbId,
    /// Always equal to the parent block's category.
    pub category_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub estimated_minutes: i32,
    pub actual_minutes: Option<i32>,
    pub completed: bool,
    pub completed_at: Option<Timestamp>,
    pub position: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    pub block_id: DbId,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 250))]
    pub description: Option<String>,
    pub estimated_minutes: i32,
    /// Inherited from the block when omitted; must match it when given.
    pub category_id: Option<DbId>,
    /// Appended after the block's last task when omitted.
    pub position: Option<i32>,
}

/// DTO for updating an existing task. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    pub block_id: Option<DbId>,
    pub category_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 250))]
    pub description: Option<String>,
    pub estimated_minutes: Option<i32>,
    pub actual_minutes: Option<i32>,
    pub completed: Option<bool>,
    pub position: Option<i32>,
}

/// Body of `POST /api/v1/tasks/{id}/complete`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteTaskRequest {
    pub actual_minutes: Option<i32>,
}

/// Body of the bulk complete/uncomplete endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskIdsRequest {
    pub task_ids: Vec<DbId>,
}

/// One entry of a bulk position rewrite.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskPositionEntry {
    pub task_id: DbId,
    pub position: i32,
}

/// Query parameters for `GET /api/v1/tasks`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskListParams {
    pub completed: Option<bool>,
    pub block_id: Option<DbId>,
    pub category_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Per-id outcome of a bulk task transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkItemStatus {
    Ok,
    NotFound,
}

/// Summary of a bulk complete/uncomplete call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkTaskResult {
    pub succeeded: usize,
    pub failed: usize,
    pub results: BTreeMap<DbId, BulkItemStatus>,
}

impl BulkTaskResult {
    pub fn record(&mut self, task_id: DbId, status: BulkItemStatus) {
        match status {
            BulkItemStatus::Ok => self.succeeded += 1,
            BulkItemStatus::NotFound => self.failed += 1,
        }
        self.results.insert(task_id, status);
    }
}
