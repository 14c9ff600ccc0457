//! Handlers for the `/tasks` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use nightshift_core::error::CoreError;
use nightshift_core::task_ledger::{
    validate_actual_minutes, validate_estimated_minutes, validate_position,
};
use nightshift_core::types::DbId;
use nightshift_db::models::task::{
    BulkTaskResult, CompleteTaskRequest, CreateTask, Task, TaskIdsRequest, TaskListParams,
    TaskPositionEntry, UpdateTask,
};
use nightshift_db::models::ReorderResult;
use nightshift_db::repositories::{BlockRepo, CategoryRepo, TaskRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn task_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks
///
/// The task inherits its block's category; see `resolve_task_category`.
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    input.validate()?;
    validate_estimated_minutes(input.estimated_minutes)?;
    if let Some(position) = input.position {
        validate_position(position)?;
    }

    let task = TaskRepo::create(&state.pool, &input).await?;
    tracing::info!(
        task_id = task.id,
        block_id = task.block_id,
        category_id = task.category_id,
        position = task.position,
        "Task created",
    );
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> AppResult<Json<Vec<Task>>> {
    let tasks = TaskRepo::list(&state.pool, &params).await?;
    Ok(Json(tasks))
}

/// GET /api/v1/tasks/block/{block_id}
pub async fn list_by_block(
    State(state): State<AppState>,
    Path(block_id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    BlockRepo::find_by_id(&state.pool, block_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Block",
            id: block_id,
        }))?;
    let tasks = TaskRepo::list_by_block(&state.pool, block_id).await?;
    Ok(Json(tasks))
}

/// GET /api/v1/tasks/category/{category_id}
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<DbId>,
) -> AppResult<Json<Vec<Task>>> {
    CategoryRepo::find_by_id(&state.pool, category_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }))?;
    let tasks = TaskRepo::list_by_category(&state.pool, category_id).await?;
    Ok(Json(tasks))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    Ok(Json(task))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    input.validate()?;
    if let Some(minutes) = input.estimated_minutes {
        validate_estimated_minutes(minutes)?;
    }
    if let Some(minutes) = input.actual_minutes {
        validate_actual_minutes(minutes)?;
    }
    if let Some(position) = input.position {
        validate_position(position)?;
    }

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tracing::info!(task_id = id, block_id = task.block_id, "Task updated");
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if TaskRepo::delete(&state.pool, id).await? {
        tracing::info!(task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(task_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// POST /api/v1/tasks/{id}/complete
///
/// The body is optional; without one no `actual_minutes` are recorded.
pub async fn complete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    input: Option<Json<CompleteTaskRequest>>,
) -> AppResult<Json<Task>> {
    let input = input.map(|Json(body)| body).unwrap_or_default();
    if let Some(minutes) = input.actual_minutes {
        validate_actual_minutes(minutes)?;
    }

    let task = TaskRepo::complete(&state.pool, id, input.actual_minutes)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tracing::info!(task_id = id, actual_minutes = ?task.actual_minutes, "Task completed");
    Ok(Json(task))
}

/// POST /api/v1/tasks/{id}/uncomplete
pub async fn uncomplete(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Task>> {
    let task = TaskRepo::uncomplete(&state.pool, id)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tracing::info!(task_id = id, "Task marked incomplete");
    Ok(Json(task))
}

/// POST /api/v1/tasks/bulk-complete
pub async fn bulk_complete(
    State(state): State<AppState>,
    Json(input): Json<TaskIdsRequest>,
) -> AppResult<Json<BulkTaskResult>> {
    let result = TaskRepo::bulk_complete(&state.pool, &input.task_ids).await?;
    tracing::info!(
        succeeded = result.succeeded,
        failed = result.failed,
        "Bulk task completion",
    );
    Ok(Json(result))
}

/// POST /api/v1/tasks/bulk-uncomplete
pub async fn bulk_uncomplete(
    State(state): State<AppState>,
    Json(input): Json<TaskIdsRequest>,
) -> AppResult<Json<BulkTaskResult>> {
    let result = TaskRepo::bulk_uncomplete(&state.pool, &input.task_ids).await?;
    tracing::info!(
        succeeded = result.succeeded,
        failed = result.failed,
        "Bulk task uncompletion",
    );
    Ok(Json(result))
}

/// POST /api/v1/tasks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Json(entries): Json<Vec<TaskPositionEntry>>,
) -> AppResult<Json<ReorderResult>> {
    let result = TaskRepo::reorder(&state.pool, &entries).await?;
    tracing::info!(
        updated = result.updated.len(),
        missing = result.missing.len(),
        "Tasks reordered",
    );
    Ok(Json(result))
}
