/// User API routes
use crate::{error::Result, middleware::AuthenticatedUser, state::AppState};
use axum::{extract::State, Json};
use musicify_storage::users;
use serde_json::{json, Value};

/// GET /api/user
/// Every registered user except the caller
pub async fn list_users(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>> {
    let others: Vec<_> = users::get_all(app_state.pool())
        .await?
        .into_iter()
        .filter(|user| user.id != auth.user().id)
        .collect();

    Ok(Json(json!({ "success": true, "users": others })))
}
