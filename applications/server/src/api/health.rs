/// Health check API routes
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

/// GET /api/health
/// Reports 503 when the catalog database cannot be queried
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<Value>) {
    let songs: Result<i64, sqlx::Error> = sqlx::query_scalar("SELECT COUNT(*) FROM songs")
        .fetch_one(app_state.pool())
        .await;

    match songs {
        Ok(songs) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "songs": songs,
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "degraded",
                    "version": env!("CARGO_PKG_VERSION"),
                    "message": "Database unavailable",
                })),
            )
        }
    }
}
