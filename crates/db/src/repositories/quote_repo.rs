//! Repository for the `quotes` table.

use sqlx::PgPool;

use crate::models::quote::{CreateQuote, Quote};

/// Column list for quotes queries.
const COLUMNS: &str = "id, text, created_at, updated_at";

/// Provides insert and latest-lookup for quotes.
pub struct QuoteRepo;

impl QuoteRepo {
    /// Insert a new quote, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateQuote) -> Result<Quote, sqlx::Error> {
        let query = format!("INSERT INTO quotes (text) VALUES ($1) RETURNING {COLUMNS}");
        sqlx::query_as::<_, Quote>(&query)
            .bind(&input.text)
            .fetch_one(pool)
            .await
    }

    /// The most recently posted quote, if any.
    pub async fn find_latest(pool: &PgPool) -> Result<Option<Quote>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM quotes ORDER BY created_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Quote>(&query)
            .fetch_optional(pool)
            .await
    }
}
