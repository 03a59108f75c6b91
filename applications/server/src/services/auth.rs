/// Authentication service - verifies identity tokens from the auth provider
///
/// Tokens are HS256 JWTs whose subject is the provider's user id (the
/// clerk id). Users themselves are created through the auth callback.
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (clerk id)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

impl AuthService {
    pub fn new(secret: String, expiration_hours: u64) -> Self {
        Self {
            secret,
            token_expiration: Duration::hours(expiration_hours as i64),
        }
    }

    /// Issue a token for `clerk_id`
    pub fn create_token(&self, clerk_id: &str) -> Result<String> {
        if clerk_id.is_empty() {
            return Err(ServerError::Auth("Missing subject".to_string()));
        }

        let now = Utc::now();
        let claims = Claims {
            sub: clerk_id.to_string(),
            exp: (now + self.token_expiration).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify a token and return its clerk id
    pub fn verify_token(&self, token: &str) -> Result<String> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;

        if token_data.claims.sub.is_empty() {
            return Err(ServerError::Auth("Token has no subject".to_string()));
        }
        Ok(token_data.claims.sub)
    }
}
