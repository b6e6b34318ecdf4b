use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,   // user id
    pub exp: usize,    // expiration time
    pub nonce: String, // keeps tokens issued in the same second distinct
}

/// Signs a short-lived HS256 access token for a user.
pub fn issue_access_token(config: &JwtConfig, user_id: i64) -> Result<String, AppError> {
    let nonce: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    let exp = (Utc::now() + Duration::minutes(config.access_token_expires_minutes)).timestamp()
        as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
        nonce,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_ref()),
    )
    .map_err(|e| AppError::Internal(format!("failed to sign access token: {e}")))
}

/// Verifies an access token and returns the user id it was issued for.
/// Expiry is checked with zero leeway.
pub fn verify_access_token(config: &JwtConfig, token: &str) -> Result<i64, AppError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_ref()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::TokenInvalid,
    })?;

    token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AppError::Internal("invalid user id in token".to_string()))
}
