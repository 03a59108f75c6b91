/// Authentication API routes
use crate::{
    error::{Result, ServerError},
    middleware::CurrentUser,
    state::AppState,
};
use axum::{extract::State, Json};
use musicify_core::UpsertUser;
use musicify_storage::users;
use serde::Deserialize;
use serde_json::{json, Value};

/// Identity payload forwarded by the frontend after the provider signs a user in
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthCallbackRequest {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image_url: Option<String>,
}

/// POST /api/auth/callback
/// Create the user on first sign-in, refresh the profile afterwards
pub async fn callback(
    State(app_state): State<AppState>,
    identity: CurrentUser,
    Json(req): Json<AuthCallbackRequest>,
) -> Result<Json<Value>> {
    if req.id.trim() != identity.clerk_id() {
        return Err(ServerError::Forbidden(
            "Token does not match the submitted identity".to_string(),
        ));
    }

    let user = users::upsert(
        app_state.pool(),
        UpsertUser {
            clerk_id: req.id,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            image_url: req.image_url,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "Auth callback for {}", user.display_name());

    Ok(Json(json!({ "success": true, "user": user })))
}
