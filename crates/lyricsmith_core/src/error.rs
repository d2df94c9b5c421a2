//! Application error types for the editing engine and storage.
use thiserror::Error;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// An operation referenced an item (or song) that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A mutation received malformed arguments.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An item constructor received fields that cannot form a valid item.
    #[error("Invalid item: {0}")]
    InvalidItem(String),

    /// Persisted or imported data could not be read.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A save was attempted without the required name or identifiers.
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    /// The remote API call failed or returned a non-success status.
    #[error("Remote sync failed: {0}")]
    RemoteFailure(String),

    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Whether this error is an expected condition that should be shown to the
    /// user as a readable message rather than treated as a bug.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::ValidationFailed(_) | Self::MalformedInput(_) | Self::RemoteFailure(_)
        )
    }
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}
