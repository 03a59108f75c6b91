/// Authentication middleware
///
/// Identity is optional at the middleware level: a request without an
/// `Authorization` header passes through untouched, a request with a bad
/// token is rejected. Handlers that need a user ask for `AuthenticatedUser`.
use crate::{error::ServerError, services::AuthService, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use musicify_core::User;
use musicify_storage::users;
use std::sync::Arc;

/// Verified external identity (the clerk id) stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser(pub String);

impl CurrentUser {
    pub fn clerk_id(&self) -> &str {
        &self.0
    }
}

/// Middleware that validates an optional bearer token
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(auth_header) = request.headers().get(AUTHORIZATION) else {
        return next.run(request).await;
    };

    let token = match auth_header.to_str().ok().and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token.trim(),
        None => {
            return ServerError::Auth("Malformed authorization header".to_string()).into_response()
        }
    };

    match auth_service.verify_token(token) {
        Ok(clerk_id) => {
            request.extensions_mut().insert(CurrentUser(clerk_id));
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!("Token verification failed: {}", e);
            ServerError::Auth("Invalid token".to_string()).into_response()
        }
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}

/// Required identity, resolved to a stored user
///
/// The user row is created by the auth callback; a valid token for a clerk
/// id that never called back is still unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl AuthenticatedUser {
    pub fn user(&self) -> &User {
        &self.0
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = CurrentUser::from_request_parts(parts, state).await?;

        users::get_by_clerk_id(state.pool(), identity.clerk_id())
            .await?
            .map(AuthenticatedUser)
            .ok_or_else(|| ServerError::Auth("User not registered".to_string()))
    }
}

/// Optional identity for routes that also serve anonymous listeners
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(identity) = parts.extensions.get::<CurrentUser>().cloned() else {
            return Ok(MaybeUser(None));
        };

        let user = users::get_by_clerk_id(state.pool(), identity.clerk_id()).await?;
        Ok(MaybeUser(user))
    }
}
