pub mod blocks;
pub mod categories;
pub mod health;
pub mod quotes;
pub mod tasks;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /categories                          list, create
/// /categories/with-tasks               categories with task counts
/// /categories/{id}                     get, update, delete
/// /categories/{id}/stats               per-category task aggregates
///
/// /blocks                              list, create
/// /blocks/next                         next block with tasks + progress
/// /blocks/active                       blocks with open tasks
/// /blocks/statistics                   queue-wide counts
/// /blocks/reorder                      bulk renumber (POST)
/// /blocks/{id}                         get, update, delete
/// /blocks/{id}/with-tasks              block + ordered tasks
/// /blocks/{id}/progress                completion snapshot
/// /blocks/{id}/complete-and-reset      cycle the block (POST)
/// /blocks/{id}/reset-tasks             clear completion (POST)
/// /blocks/{id}/move-to-end             requeue (POST)
/// /blocks/{id}/clone                   duplicate (POST)
///
/// /tasks                               list, create
/// /tasks/reorder                       bulk position rewrite (POST)
/// /tasks/bulk-complete                 (POST)
/// /tasks/bulk-uncomplete               (POST)
/// /tasks/block/{block_id}              tasks in a block
/// /tasks/category/{category_id}        tasks in a category
/// /tasks/{id}                          get, update, delete
/// /tasks/{id}/complete                 (POST)
/// /tasks/{id}/uncomplete               (POST)
///
/// /quotes                              create (POST)
/// /quotes/latest                       most recent quote
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::router())
        .nest("/blocks", blocks::router())
        .nest("/tasks", tasks::router())
        .nest("/quotes", quotes::router())
}
