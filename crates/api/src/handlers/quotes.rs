//! Handlers for the `/quotes` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use nightshift_core::error::CoreError;
use nightshift_db::models::quote::{CreateQuote, Quote};
use nightshift_db::repositories::QuoteRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/quotes
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateQuote>,
) -> AppResult<(StatusCode, Json<Quote>)> {
    input.validate()?;
    if input.text.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "text must not be empty".to_string(),
        )));
    }

    let quote = QuoteRepo::create(&state.pool, &input).await?;
    tracing::info!(quote_id = quote.id, "Quote posted");
    Ok((StatusCode::CREATED, Json(quote)))
}

/// GET /api/v1/quotes/latest
///
/// 404 until the first quote is posted.
pub async fn latest(State(state): State<AppState>) -> AppResult<Json<Quote>> {
    let quote = QuoteRepo::find_latest(&state.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("No quotes have been posted yet".to_string()))?;
    Ok(Json(quote))
}
