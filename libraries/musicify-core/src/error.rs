/// Core error types for Musicify
use crate::types::SongId;
use thiserror::Error;

/// Result type alias using `MusicifyError`
pub type Result<T> = std::result::Result<T, MusicifyError>;

/// Core error type for Musicify
#[derive(Error, Debug)]
pub enum MusicifyError {
    /// Missing required field or malformed identifier
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Genre name collides with an existing genre after normalization
    #[error("Genre already exists: {0}")]
    DuplicateName(String),

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Song not found
    #[error("Song not found: {0}")]
    SongNotFound(SongId),

    /// Caller may not touch the resource
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The atomic update path aborted; nothing was persisted
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Database errors (for storage implementations)
    #[error("Database error: {0}")]
    Database(String),

    /// Remote collaborator (upload, metadata lookup) failed
    #[error("External service error: {0}")]
    External(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl MusicifyError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied(msg.into())
    }

    /// Create an external service error
    pub fn external(msg: impl Into<String>) -> Self {
        Self::External(msg.into())
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateName(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::SongNotFound(_))
    }
}

#[cfg(feature = "sqlx-support")]
impl From<sqlx::Error> for MusicifyError {
    fn from(err: sqlx::Error) -> Self {
        // The unique index on genres.normalized_name backs up the explicit check
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() && is_genre_name_index(db_err.message()) {
                return Self::DuplicateName(db_err.message().to_string());
            }
        }
        Self::Database(err.to_string())
    }
}

/// `SQLite` names the violated columns as `table.column`
#[cfg(feature = "sqlx-support")]
fn is_genre_name_index(message: &str) -> bool {
    message.contains("genres.normalized_name")
}
