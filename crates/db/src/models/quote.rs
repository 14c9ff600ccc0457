//! Quote entity model and DTOs.

use nightshift_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `quotes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Quote {
    pub id: DbId,
    pub text: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for posting a new quote.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuote {
    #[validate(length(min = 1, max = 500))]
    pub text: String,
}
