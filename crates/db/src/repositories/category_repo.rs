//! Repository for the `categories` table.

use nightshift_core::error::CoreError;
use nightshift_core::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use nightshift_core::task_ledger::completion_percentage;
use nightshift_core::types::DbId;
use sqlx::PgPool;

use crate::error::RepoError;
use crate::models::category::{
    Category, CategoryStats, CategoryWithTaskCounts, CreateCategory, UpdateCategory,
};

/// Column list for categories queries.
const COLUMNS: &str = "id, name, color, created_at, updated_at";

/// Provides CRUD operations and task aggregates for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, color) VALUES ($1, $2) RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.color)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List categories ordered by name.
    pub async fn list(
        pool: &PgPool,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let limit_val = clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset_val = clamp_offset(offset);

        let query = format!(
            "SELECT {COLUMNS} FROM categories ORDER BY name ASC, id ASC LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(limit_val)
            .bind(offset_val)
            .fetch_all(pool)
            .await
    }

    /// Every category with the number of tasks carrying it, in one query.
    pub async fn list_with_task_counts(
        pool: &PgPool,
    ) -> Result<Vec<CategoryWithTaskCounts>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithTaskCounts>(
            "SELECT c.id, c.name, c.color, \
                    COUNT(t.id) AS total_tasks, \
                    COUNT(t.id) FILTER (WHERE t.completed) AS completed_tasks, \
                    c.created_at, c.updated_at \
             FROM categories c \
             LEFT JOIN tasks t ON t.category_id = c.id \
             GROUP BY c.id \
             ORDER BY c.name ASC, c.id ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a category. Returns `None` if no row has the given id.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                name  = COALESCE($1, name), \
                color = COALESCE($2, color) \
             WHERE id = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(&input.name)
            .bind(&input.color)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category that nothing references.
    ///
    /// Returns `Ok(false)` when the category does not exist and
    /// [`CoreError::Conflict`] while any task or block still carries it.
    /// The category row is locked for the duration of the check.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let exists: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(false);
        }

        let (task_refs, block_refs): (i64, i64) = sqlx::query_as(
            "SELECT \
                (SELECT COUNT(*) FROM tasks WHERE category_id = $1), \
                (SELECT COUNT(*) FROM blocks WHERE category_id = $1)",
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        if task_refs > 0 || block_refs > 0 {
            return Err(CoreError::Conflict(format!(
                "Category {id} is still used by {task_refs} task(s) and {block_refs} block(s)"
            ))
            .into());
        }

        sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Task aggregates for one category. Returns `None` if it does not exist.
    pub async fn stats(pool: &PgPool, id: DbId) -> Result<Option<CategoryStats>, sqlx::Error> {
        let row: Option<(DbId, String, i64, i64, i64, i64)> = sqlx::query_as(
            "SELECT c.id, c.name, \
                    COUNT(t.id), \
                    COUNT(t.id) FILTER (WHERE t.completed), \
                    COALESCE(SUM(t.estimated_minutes), 0)::BIGINT, \
                    COALESCE(SUM(t.actual_minutes), 0)::BIGINT \
             FROM categories c \
             LEFT JOIN tasks t ON t.category_id = c.id \
             WHERE c.id = $1 \
             GROUP BY c.id",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(
            |(category_id, category_name, total, completed, estimated, actual)| CategoryStats {
                category_id,
                category_name,
                total_tasks: total,
                completed_tasks: completed,
                completion_rate: completion_percentage(completed, total),
                total_estimated_minutes: estimated,
                total_actual_minutes: actual,
            },
        ))
    }
}
