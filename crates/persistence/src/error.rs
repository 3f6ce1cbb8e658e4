use thiserror::Error;

/// Errors that can occur when writing to or reading from a store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The record targeted by an update or delete does not exist.
    #[error("{entity_type} not found: {id}")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The record targeted by an update or delete was already tombstoned.
    #[error("{entity_type} {id} has been deleted")]
    Tombstoned {
        entity_type: &'static str,
        id: String,
    },

    /// The batch is malformed (e.g. a create that already carries an identifier).
    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    /// The store refused the write for a reason of its own.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A database migration error occurred.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
