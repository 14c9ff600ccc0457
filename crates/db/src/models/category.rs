//! Category entity model and DTOs.

use nightshift_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A category joined with counts of the tasks that carry it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithTaskCounts {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Per-category task aggregates returned by `GET /categories/{id}/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryStats {
    pub category_id: DbId,
    pub category_name: String,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub completion_rate: f64,
    pub total_estimated_minutes: i64,
    pub total_actual_minutes: i64,
}

/// DTO for creating a new category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    /// Hex color, `#RGB` or `#RRGGBB`.
    pub color: String,
}

/// DTO for updating an existing category. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub color: Option<String>,
}
