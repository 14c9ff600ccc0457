use axum::routing::{get, post};
use axum::Router;

use crate::handlers::quotes;
use crate::state::AppState;

/// Routes mounted at `/quotes`.
///
/// ```text
/// POST   /          -> create
/// GET    /latest    -> latest
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(quotes::create))
        .route("/latest", get(quotes::latest))
}
