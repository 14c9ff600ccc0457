//! Route definitions for the `/tasks` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::tasks;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /                            -> list
/// POST   /                            -> create
/// POST   /reorder                     -> reorder
/// POST   /bulk-complete               -> bulk_complete
/// POST   /bulk-uncomplete             -> bulk_uncomplete
/// GET    /block/{block_id}            -> list_by_block
/// GET    /category/{category_id}      -> list_by_category
/// GET    /{id}                        -> get_by_id
/// PUT    /{id}                        -> update
/// DELETE /{id}                        -> delete
/// POST   /{id}/complete               -> complete
/// POST   /{id}/uncomplete             -> uncomplete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tasks::list).post(tasks::create))
        .route("/reorder", post(tasks::reorder))
        .route("/bulk-complete", post(tasks::bulk_complete))
        .route("/bulk-uncomplete", post(tasks::bulk_uncomplete))
        .route("/block/{block_id}", get(tasks::list_by_block))
        .route("/category/{category_id}", get(tasks::list_by_category))
        .route(
            "/{id}",
            get(tasks::get_by_id).put(tasks::update).delete(tasks::delete),
        )
        .route("/{id}/complete", post(tasks::complete))
        .route("/{id}/uncomplete", post(tasks::uncomplete))
}
