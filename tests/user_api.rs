mod helpers;

use helpers::{login, mock_kakao_user, spawn_app};
use nonggle_server::response::ApiResponse;
use nonggle_server::user::UserProfile;
use reqwest::StatusCode;

#[tokio::test]
async fn me_returns_the_authenticated_profile() {
    let app = spawn_app().await;
    mock_kakao_user(&app.kakao_server, 12345, Some("nonggle")).await;
    let tokens = login(&app, "kakao-access-token").await;

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<UserProfile> = response.json().await.unwrap();
    let profile = body.data.unwrap();
    assert_eq!(profile.id, tokens.user_id);
    assert_eq!(profile.kakao_id, "12345");
    assert_eq!(profile.nickname.as_deref(), Some("nonggle"));
}

#[tokio::test]
async fn me_without_a_token_is_unauthorized() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/users/me")).send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: ApiResponse<UserProfile> = response.json().await.unwrap();
    assert!(!body.success);
    assert_eq!(body.error.unwrap().code, 401);
}

#[tokio::test]
async fn me_with_a_garbage_token_is_unauthorized() {
    let app = spawn_app().await;

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth("not.a.jwt")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn a_deleted_users_token_stops_working() {
    let app = spawn_app().await;
    mock_kakao_user(&app.kakao_server, 12345, None).await;
    let tokens = login(&app, "kakao-access-token").await;

    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(tokens.user_id)
        .execute(&app.db_pool)
        .await
        .unwrap();

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn the_nickname_follows_kakao_on_the_next_login() {
    let app = spawn_app().await;
    mock_kakao_user(&app.kakao_server, 12345, Some("before")).await;
    let tokens = login(&app, "kakao-access-token").await;

    app.kakao_server.reset().await;
    mock_kakao_user(&app.kakao_server, 12345, Some("after")).await;
    let tokens = {
        let second = login(&app, "kakao-access-token").await;
        assert_eq!(second.user_id, tokens.user_id);
        second
    };

    let response = app
        .client
        .get(app.url("/users/me"))
        .bearer_auth(&tokens.access_token)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ApiResponse<UserProfile> = response.json().await.unwrap();
    assert_eq!(body.data.unwrap().nickname.as_deref(), Some("after"));
}
