use nightshift_core::error::CoreError;

/// Error returned by repository operations that enforce domain rules
/// inside a transaction (queue numbering, category inheritance, reference
/// checks) in addition to talking to the database.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
