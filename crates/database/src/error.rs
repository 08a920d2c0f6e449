use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database query failed: {0}")]
    QueryError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// Input was rejected, or a stored value could not be mapped back to a core type.
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("The requested data was not found in the database.")]
    NotFound,

    #[error("The store is unavailable: {0}")]
    Unavailable(String),
}
