//! Handlers for the `/blocks` resource and the queue engine actions.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use nightshift_core::block_queue::{validate_block_title, validate_day_number};
use nightshift_core::error::CoreError;
use nightshift_core::statistics::BlockStatistics;
use nightshift_core::task_ledger::BlockProgress;
use nightshift_core::types::DbId;
use nightshift_db::models::block::{
    ActiveBlockParams, Block, BlockListParams, BlockOrderEntry, BlockWithTasks,
    CloneBlockParams, CompleteAndResetParams, CompleteAndResetResult, CreateBlock, NextBlock,
    ResetTasksResult, UpdateBlock,
};
use nightshift_db::models::ReorderResult;
use nightshift_db::repositories::{BlockRepo, StatisticsRepo, TaskRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

fn block_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Block", id })
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// POST /api/v1/blocks
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateBlock>,
) -> AppResult<(StatusCode, Json<Block>)> {
    input.validate()?;
    validate_block_title(&input.title)?;
    validate_day_number(input.day_number)?;

    let block = BlockRepo::create(&state.pool, &input).await?;
    tracing::info!(
        block_id = block.id,
        block_number = block.block_number,
        day_number = block.day_number,
        "Block created",
    );
    Ok((StatusCode::CREATED, Json(block)))
}

/// GET /api/v1/blocks
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<BlockListParams>,
) -> AppResult<Json<Vec<Block>>> {
    let blocks = BlockRepo::list(&state.pool, &params).await?;
    Ok(Json(blocks))
}

/// GET /api/v1/blocks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Block>> {
    let block = BlockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    Ok(Json(block))
}

/// GET /api/v1/blocks/{id}/with-tasks
pub async fn get_with_tasks(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BlockWithTasks>> {
    let block = BlockRepo::find_with_tasks(&state.pool, id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    Ok(Json(block))
}

/// PUT /api/v1/blocks/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateBlock>,
) -> AppResult<Json<Block>> {
    input.validate()?;
    if let Some(title) = &input.title {
        validate_block_title(title)?;
    }

    let block = BlockRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    tracing::info!(block_id = id, block_number = block.block_number, "Block updated");
    Ok(Json(block))
}

/// DELETE /api/v1/blocks/{id}
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    if BlockRepo::delete(&state.pool, id).await? {
        tracing::info!(block_id = id, "Block deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(block_not_found(id))
    }
}

// ---------------------------------------------------------------------------
// Queue views
// ---------------------------------------------------------------------------

/// GET /api/v1/blocks/next
///
/// Returns a `{"block": null, "message": ...}` sentinel instead of 404 when
/// no block has tasks.
pub async fn next(State(state): State<AppState>) -> AppResult<Json<NextBlock>> {
    let next = BlockRepo::find_next(&state.pool).await?;
    Ok(Json(next))
}

/// GET /api/v1/blocks/active
pub async fn active(
    State(state): State<AppState>,
    Query(params): Query<ActiveBlockParams>,
) -> AppResult<Json<Vec<Block>>> {
    let blocks = BlockRepo::list_active(&state.pool, params.day_number).await?;
    Ok(Json(blocks))
}

/// GET /api/v1/blocks/statistics
pub async fn statistics(State(state): State<AppState>) -> AppResult<Json<BlockStatistics>> {
    let stats = StatisticsRepo::block_statistics(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/v1/blocks/{id}/progress
pub async fn progress(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<BlockProgress>> {
    BlockRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    let progress = TaskRepo::block_progress(&state.pool, id).await?;
    Ok(Json(progress))
}

// ---------------------------------------------------------------------------
// Queue transitions
// ---------------------------------------------------------------------------

/// POST /api/v1/blocks/{id}/complete-and-reset?move_to_end=bool
pub async fn complete_and_reset(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<CompleteAndResetParams>,
) -> AppResult<Json<CompleteAndResetResult>> {
    let result = BlockRepo::complete_and_reset(&state.pool, id, params.move_to_end)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    tracing::info!(
        block_id = id,
        tasks_completed = result.tasks_completed,
        tasks_reset = result.tasks_reset,
        new_block_number = result.new_block_number,
        moved_to_end = result.moved_to_end,
        "Block completed and reset",
    );
    Ok(Json(result))
}

/// POST /api/v1/blocks/{id}/reset-tasks
pub async fn reset_tasks(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ResetTasksResult>> {
    let result = BlockRepo::reset_tasks(&state.pool, id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    tracing::info!(block_id = id, tasks_reset = result.tasks_reset, "Block tasks reset");
    Ok(Json(result))
}

/// POST /api/v1/blocks/{id}/move-to-end
pub async fn move_to_end(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Block>> {
    let block = BlockRepo::move_to_end(&state.pool, id)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    tracing::info!(block_id = id, block_number = block.block_number, "Block moved to end");
    Ok(Json(block))
}

/// POST /api/v1/blocks/{id}/clone?copy_tasks=bool
pub async fn clone_block(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Query(params): Query<CloneBlockParams>,
) -> AppResult<(StatusCode, Json<Block>)> {
    let block = BlockRepo::clone_block(&state.pool, id, params.copy_tasks)
        .await?
        .ok_or_else(|| block_not_found(id))?;
    tracing::info!(
        source_block_id = id,
        block_id = block.id,
        block_number = block.block_number,
        copy_tasks = params.copy_tasks,
        "Block cloned",
    );
    Ok((StatusCode::CREATED, Json(block)))
}

/// POST /api/v1/blocks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    Json(entries): Json<Vec<BlockOrderEntry>>,
) -> AppResult<Json<ReorderResult>> {
    let result = BlockRepo::reorder(&state.pool, &entries).await?;
    tracing::info!(
        updated = result.updated.len(),
        missing = result.missing.len(),
        "Blocks renumbered",
    );
    Ok(Json(result))
}
