//! Error types for todo-core

use thiserror::Error;

use crate::item::ItemId;

/// Result type alias for todo operations
pub type Result<T> = std::result::Result<T, TodoError>;

/// Main error type for todo operations
#[derive(Error, Debug)]
pub enum TodoError {
    /// The id references no stored item
    #[error("Item not found: {0}")]
    NotFound(ItemId),

    /// Request rejected before touching the store
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl TodoError {
    /// Whether this error is an opaque storage fault rather than a domain error
    pub fn is_storage(&self) -> bool {
        matches!(self, TodoError::Storage(_))
    }
}

/// Storage-specific errors
///
/// Every driver failure collapses into one of these; callers never branch on
/// the underlying SQLite error code.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// A schema migration step failed
    #[error("Migration {version} failed: {message}")]
    Migration { version: u32, message: String },

    /// The store could not be reached (e.g. a poisoned lock around the connection)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Database(err.to_string())
    }
}

impl From<rusqlite::Error> for TodoError {
    fn from(err: rusqlite::Error) -> Self {
        TodoError::Storage(StorageError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rusqlite_errors_are_storage() {
        let err: TodoError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(err.is_storage());
        assert!(err.to_string().starts_with("Storage error: Database error"));
    }

    #[test]
    fn test_domain_errors_are_not_storage() {
        assert!(!TodoError::NotFound(ItemId::new(7)).is_storage());
        assert!(!TodoError::InvalidInput("Title is required".into()).is_storage());
        assert_eq!(
            TodoError::NotFound(ItemId::new(7)).to_string(),
            "Item not found: 7"
        );
    }
}
