use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, web_server::AppState};

/// The authenticated caller, placed into request extensions by the auth
/// middleware.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub kakao_id: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A missing AuthUser means the route was wired without the auth
        // middleware, which is a server bug rather than a client error.
        let user = parts.extensions.get::<AuthUser>().ok_or_else(|| {
            AppError::Internal(
                "AuthUser not found in request extensions. Is the auth middleware missing?".into(),
            )
        })?;

        Ok(user.clone())
    }
}
