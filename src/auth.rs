use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use base64::engine::{general_purpose, Engine as _};
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use validator::Validate;

use crate::config::JwtConfig;
use crate::db::DbPool;
use crate::error::{AppError, AuthError};
use crate::extractors::AuthUser;
use crate::jwt;
use crate::response::ApiResponse;
use crate::user;
use crate::web_server::AppState;

// --- Request / response payloads ---

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct KakaoLoginRequest {
    /// Access token the client obtained from the Kakao SDK.
    #[validate(length(min = 1, message = "access_token must not be empty"))]
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshPayload {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub user_id: i64,
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRecord {
    user_id: i64,
    expires_at: chrono::NaiveDateTime,
}

fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

// --- Token rotation core ---

/// Creates a new access token and refresh token for a user, storing only the
/// hash of the refresh token. The user's previous refresh token (if any) is
/// replaced, and when `old_token_hash` is given it is deleted in the same
/// transaction so a rotated-out token can never be replayed.
async fn issue_tokens(
    user_id: i64,
    db_pool: &DbPool,
    jwt_config: &JwtConfig,
    old_token_hash: Option<&str>,
) -> Result<LoginResponse, AppError> {
    let access_token = jwt::issue_access_token(jwt_config, user_id)?;

    let mut refresh_token_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut refresh_token_bytes);
    let new_refresh_token = general_purpose::URL_SAFE_NO_PAD.encode(refresh_token_bytes);

    let new_refresh_token_hash = hash_refresh_token(&new_refresh_token);
    let new_refresh_token_exp =
        (Utc::now() + Duration::days(jwt_config.refresh_token_expires_days)).naive_utc();

    let mut tx = db_pool.begin().await?;

    if let Some(old_hash) = old_token_hash {
        sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(old_hash)
            .execute(&mut *tx)
            .await?;
    }

    // One active refresh token per user: logging in again invalidates any
    // other session.
    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token_hash, expires_at) VALUES (?, ?, ?)
         ON CONFLICT(user_id) DO UPDATE SET token_hash = excluded.token_hash, expires_at = excluded.expires_at",
    )
    .bind(user_id)
    .bind(&new_refresh_token_hash)
    .bind(new_refresh_token_exp)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(LoginResponse {
        user_id,
        access_token,
        refresh_token: new_refresh_token,
    })
}

// --- API handlers ---

/// ## Kakao login
/// Exchanges a Kakao access token for a Nonggle session: looks the profile up
/// at the Kakao API, creates the user on first login, and returns a fresh
/// access/refresh token pair.
#[utoipa::path(
    post,
    path = "/auth/kakao",
    tag = "auth",
    request_body = KakaoLoginRequest,
    responses(
        (status = 200, description = "Login successful"),
        (status = 400, description = "Empty access token"),
        (status = 401, description = "Kakao rejected the access token"),
        (status = 502, description = "Kakao API unreachable"),
    )
)]
pub async fn kakao_login(
    State(state): State<AppState>,
    Json(payload): Json<KakaoLoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    payload.validate()?;

    let kakao_user = state.kakao_client.get_user_info(&payload.access_token).await?;
    tracing::info!("Kakao login for kakao_id {}", kakao_user.kakao_id);

    let user = user::upsert_by_kakao_id(
        &state.db_pool,
        &kakao_user.kakao_id,
        kakao_user.nickname.as_deref(),
    )
    .await?;

    let tokens = issue_tokens(user.id, &state.db_pool, &state.app_config.jwt, None).await?;

    Ok(Json(ApiResponse::ok(tokens)))
}

/// ## Refresh the session
/// Rotates the refresh token: the presented token is invalidated and a new
/// access/refresh pair is returned.
#[utoipa::path(
    post,
    path = "/auth/token/refresh",
    tag = "auth",
    request_body = RefreshPayload,
    responses(
        (status = 200, description = "Token refreshed"),
        (status = 401, description = "Missing, invalid or expired refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshPayload>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    if payload.refresh_token.trim().is_empty() {
        return Err(AuthError::RefreshTokenMissing.into());
    }

    let incoming_token_hash = hash_refresh_token(&payload.refresh_token);

    let record = sqlx::query_as::<_, RefreshTokenRecord>(
        "SELECT user_id, expires_at FROM refresh_tokens WHERE token_hash = ?",
    )
    .bind(&incoming_token_hash)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or(AuthError::RefreshTokenInvalid)?;

    if record.expires_at < Utc::now().naive_utc() {
        // Cleanup; the outcome of the delete does not change the answer.
        sqlx::query("DELETE FROM refresh_tokens WHERE token_hash = ?")
            .bind(&incoming_token_hash)
            .execute(&state.db_pool)
            .await
            .ok();
        return Err(AuthError::RefreshTokenExpired.into());
    }

    let tokens = issue_tokens(
        record.user_id,
        &state.db_pool,
        &state.app_config.jwt,
        Some(&incoming_token_hash),
    )
    .await?;

    Ok(Json(ApiResponse::ok(tokens)))
}

/// ## Logout
/// Invalidates the caller's refresh token. The access token stays valid until
/// it expires, which is why access tokens are short-lived.
#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Logout successful"),
        (status = 401, description = "Authentication required"),
    )
)]
pub async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<StatusCode, AppError> {
    sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
        .bind(user.id)
        .execute(&state.db_pool)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

// --- Bearer-token middleware ---

/// Authenticates a request from its `Authorization: Bearer` header and stashes
/// the resolved user in request extensions for the handlers behind it.
pub async fn auth_middleware(
    State(state): State<AppState>,
    auth_header: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = auth_header
        .ok_or(AuthError::Unauthorized)?
        .token()
        .to_owned();

    let user_id = jwt::verify_access_token(&state.app_config.jwt, &token)?;

    // A valid token for a deleted user must not authenticate.
    let user = user::find_by_id(&state.db_pool, user_id)
        .await?
        .ok_or(AuthError::Unauthorized)?;

    request.extensions_mut().insert(AuthUser {
        id: user.id,
        kakao_id: user.kakao_id,
    });

    Ok(next.run(request).await)
}
