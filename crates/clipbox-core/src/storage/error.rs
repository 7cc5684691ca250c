//! Storage error handling
//!
//! Provides typed errors for link store operations with descriptive messages
//! and recovery suggestions.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during link store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// SQLite rejected the open, read or write
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Database was written by a newer schema than this build understands
    #[error("Database at '{path}' has schema version {found}, newer than supported version {supported}")]
    SchemaTooNew {
        path: PathBuf,
        found: i32,
        supported: i32,
    },

    /// The connection can no longer be used
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// Export data could not be written or parsed
    #[error("Invalid export data: {0}")]
    Json(#[from] serde_json::Error),

    /// No link with this id
    #[error("Link not found: {0}")]
    NotFound(Uuid),
}

impl StoreError {
    /// True for failures of the persistence layer itself
    pub fn is_storage_fault(&self) -> bool {
        !matches!(self, StoreError::NotFound(_) | StoreError::Json(_))
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            StoreError::SchemaTooNew { .. } => {
                Some("Upgrade clipbox, or point data_dir at a different directory.")
            }
            StoreError::Unavailable(_) => Some("Restart clipbox to reopen the database."),
            StoreError::Json(_) => {
                Some("Import expects a JSON array of links as written by `clipbox export`.")
            }
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
