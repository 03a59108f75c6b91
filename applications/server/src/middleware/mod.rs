/// Request middleware and identity extractors
pub mod auth;

pub use auth::{auth_middleware, AuthenticatedUser, CurrentUser, MaybeUser};
