/// Server error types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use musicify_core::MusicifyError;
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Genre name collides after normalization
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// The request would cascade further than the caller confirmed
    #[error("Confirmation required: {message}")]
    ConfirmationRequired { message: String, song_count: usize },

    #[error("Update did not apply: {0}")]
    TransactionFailed(String),

    #[error("Upstream service error: {0}")]
    Upstream(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl From<MusicifyError> for ServerError {
    fn from(err: MusicifyError) -> Self {
        match err {
            MusicifyError::Validation(msg) => ServerError::BadRequest(msg),
            MusicifyError::DuplicateName(name) => {
                ServerError::Duplicate(format!("Genre already exists: {}", name))
            }
            e @ (MusicifyError::NotFound { .. } | MusicifyError::SongNotFound(_)) => {
                ServerError::NotFound(e.to_string())
            }
            MusicifyError::PermissionDenied(msg) => ServerError::Forbidden(msg),
            MusicifyError::TransactionFailed(msg) => ServerError::TransactionFailed(msg),
            MusicifyError::External(msg) => ServerError::Upstream(msg),
            MusicifyError::Io(e) => ServerError::Io(e),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ServerError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            ServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Duplicate(msg) => (StatusCode::CONFLICT, msg.clone()),
            ServerError::ConfirmationRequired { message, .. } => {
                (StatusCode::CONFLICT, message.clone())
            }
            ServerError::TransactionFailed(msg) => {
                tracing::error!("Transaction failed: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Update did not apply".to_string(),
                )
            }
            ServerError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "External service unavailable".to_string(),
                )
            }
            ServerError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ServerError::Config(msg) => {
                tracing::error!("Config error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Configuration error".to_string(),
                )
            }
            ServerError::Io(e) => {
                tracing::error!("IO error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "IO error".to_string())
            }
            ServerError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                (StatusCode::UNAUTHORIZED, "Invalid token".to_string())
            }
        };

        let body = match &self {
            ServerError::Duplicate(_) => json!({
                "success": false,
                "message": message,
                "isDuplicate": true,
            }),
            ServerError::ConfirmationRequired { song_count, .. } => json!({
                "success": false,
                "message": message,
                "requiresConfirmation": true,
                "songCount": song_count,
            }),
            _ => json!({
                "success": false,
                "message": message,
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_mapping() {
        assert!(matches!(
            ServerError::from(MusicifyError::DuplicateName("Pop".into())),
            ServerError::Duplicate(_)
        ));
        assert!(matches!(
            ServerError::from(MusicifyError::SongNotFound(3)),
            ServerError::NotFound(_)
        ));
        assert!(matches!(
            ServerError::from(MusicifyError::validation("bad id")),
            ServerError::BadRequest(_)
        ));
        assert!(matches!(
            ServerError::from(MusicifyError::Database("disk I/O".into())),
            ServerError::Internal(_)
        ));
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ServerError::Auth("x".into()), StatusCode::UNAUTHORIZED),
            (ServerError::Forbidden("x".into()), StatusCode::FORBIDDEN),
            (ServerError::Duplicate("x".into()), StatusCode::CONFLICT),
            (
                ServerError::TransactionFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
