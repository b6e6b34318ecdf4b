use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use validator::ValidationErrors;

use crate::response::ApiResponse;

/// Authentication failures, all surfaced to clients as 401 with the envelope
/// error code 401. The distinction matters for logging and for clients that
/// branch on the message.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthorized,

    #[error("access token has expired")]
    TokenExpired,

    #[error("access token is invalid")]
    TokenInvalid,

    #[error("refresh token is required")]
    RefreshTokenMissing,

    #[error("refresh token has expired")]
    RefreshTokenExpired,

    #[error("refresh token is invalid")]
    RefreshTokenInvalid,

    #[error("kakao rejected the access token")]
    KakaoRejected,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error: {0}")]
    Internal(String),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("kakao api request failed: {0}")]
    KakaoTransport(#[from] reqwest::Error),

    #[error("kakao api returned status {0}")]
    KakaoStatus(reqwest::StatusCode),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::Internal(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    500,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    500,
                    "Internal server error".to_string(),
                )
            }
            AppError::Auth(e) => {
                tracing::warn!("Authentication failure: {}", e);
                (StatusCode::UNAUTHORIZED, 401, e.to_string())
            }
            AppError::KakaoTransport(e) => {
                tracing::error!("Kakao request failed: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    502,
                    "Failed to reach the Kakao API".to_string(),
                )
            }
            AppError::KakaoStatus(status) => {
                tracing::error!("Kakao API returned unexpected status: {}", status);
                (
                    StatusCode::BAD_GATEWAY,
                    502,
                    "Kakao API returned an unexpected response".to_string(),
                )
            }
            AppError::Validation(errors) => {
                let message = format!("Input validation failed: {errors}").replace('\n', ", ");
                (StatusCode::BAD_REQUEST, 400, message)
            }
        };

        let body = Json(ApiResponse::<()>::fail(code, message));
        (status, body).into_response()
    }
}
