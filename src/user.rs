use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::error::AppError;
use crate::extractors::AuthUser;
use crate::response::ApiResponse;
use crate::web_server::AppState;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub kakao_id: String,
    pub nickname: Option<String>,
}

/// Inserts the user on first login; on later logins keeps the row and picks up
/// a changed Kakao nickname.
pub async fn upsert_by_kakao_id(
    pool: &DbPool,
    kakao_id: &str,
    nickname: Option<&str>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (kakao_id, nickname) VALUES (?, ?)
         ON CONFLICT(kakao_id) DO UPDATE SET nickname = COALESCE(excluded.nickname, users.nickname)
         RETURNING id, kakao_id, nickname",
    )
    .bind(kakao_id)
    .bind(nickname)
    .fetch_one(pool)
    .await
}

pub async fn find_by_id(pool: &DbPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT id, kakao_id, nickname FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfile {
    pub id: i64,
    pub kakao_id: String,
    pub nickname: Option<String>,
}

/// ## Current user profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Profile of the authenticated user"),
        (status = 401, description = "Authentication required"),
    )
)]
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<UserProfile>>, AppError> {
    let user = find_by_id(&state.db_pool, user.id)
        .await?
        .ok_or(crate::error::AuthError::Unauthorized)?;

    Ok(Json(ApiResponse::ok(UserProfile {
        id: user.id,
        kakao_id: user.kakao_id,
        nickname: user.nickname,
    })))
}
