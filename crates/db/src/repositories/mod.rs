//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Methods that enforce domain rules
//! inside a transaction return [`crate::error::RepoError`]; plain queries
//! return `sqlx::Error`.

pub mod block_repo;
pub mod category_repo;
pub mod quote_repo;
pub mod statistics_repo;
pub mod task_repo;

pub use block_repo::BlockRepo;
pub use category_repo::CategoryRepo;
pub use quote_repo::QuoteRepo;
pub use statistics_repo::StatisticsRepo;
pub use task_repo::TaskRepo;
