//! Route definitions for the `/blocks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::blocks;
use crate::state::AppState;

/// Routes mounted at `/blocks`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// GET    /next                        -> next
/// GET    /active                      -> active
/// GET    /statistics                  -> statistics
/// POST   /reorder                     -> reorder
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
/// GET    /{id}/with-tasks             -> get_with_tasks
/// GET    /{id}/progress               -> progress
/// POST   /{id}/complete-and-reset     -> complete_and_reset
/// POST   /{id}/reset-tasks            -> reset_tasks
/// POST   /{id}/move-to-end            -> move_to_end
/// POST   /{id}/clone                  -> clone_block
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(blocks::list).post(blocks::create))
        .route("/next", get(blocks::next))
        .route("/active", get(blocks::active))
        .route("/statistics", get(blocks::statistics))
        .route("/reorder", post(blocks::reorder))
        .route(
            "/{id}",
            get(blocks::get_by_id)
                .put(blocks::update)
                .delete(blocks::delete),
        )
        .route("/{id}/with-tasks", get(blocks::get_with_tasks))
        .route("/{id}/progress", get(blocks::progress))
        .route("/{id}/complete-and-reset", post(blocks::complete_and_reset))
        .route("/{id}/reset-tasks", post(blocks::reset_tasks))
        .route("/{id}/move-to-end", post(blocks::move_to_end))
        .route("/{id}/clone", post(blocks::clone_block))
}
