use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use nonggle_server::auth::LoginResponse;
use nonggle_server::config::{AppConfig, DatabaseConfig, JwtConfig, KakaoConfig, WebConfig};
use nonggle_server::db::DbPool;
use nonggle_server::kakao::KakaoClient;
use nonggle_server::response::ApiResponse;
use nonggle_server::web_server::{create_router, AppState};
use once_cell::sync::Lazy;
use reqwest::StatusCode;
use serde_json::json;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Initialize tracing at most once across all tests; opt in with TEST_LOG=1.
static TRACING: Lazy<()> = Lazy::new(|| {
    if std::env::var("TEST_LOG").is_ok() {
        tracing_subscriber::fmt().init();
    }
});

pub struct TestApp {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    pub db_pool: DbPool,
    pub kakao_server: MockServer,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Spawns the full application against an in-memory SQLite database and a
/// wiremock server standing in for the Kakao API.
pub async fn spawn_app() -> TestApp {
    Lazy::force(&TRACING);

    let kakao_server = MockServer::start().await;

    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let connect_options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    // A single connection, so the server and the test assertions see the same
    // in-memory database.
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(connect_options)
        .await
        .expect("Failed to create in-memory database pool.");

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run migrations on test database.");

    let config = AppConfig {
        web: WebConfig {
            addr: "127.0.0.1".to_string(),
            port: addr.port(),
            cors_origin: "http://localhost:5173".to_string(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret".to_string(),
            access_token_expires_minutes: 15,
            refresh_token_expires_days: 14,
        },
        kakao: KakaoConfig {
            user_info_url: format!("{}/v2/user/me", kakao_server.uri()),
        },
    };

    let kakao_client = KakaoClient::new(&config.kakao);
    let state = AppState {
        db_pool: db_pool.clone(),
        app_config: config,
        kakao_client,
    };
    let app = create_router(state);

    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service())
            .await
            .unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        client,
        db_pool,
        kakao_server,
    }
}

/// Makes the Kakao mock answer user-info requests with the given profile.
pub async fn mock_kakao_user(server: &MockServer, kakao_id: i64, nickname: Option<&str>) {
    let body = match nickname {
        Some(nickname) => json!({ "id": kakao_id, "properties": { "nickname": nickname } }),
        None => json!({ "id": kakao_id }),
    };

    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Makes the Kakao mock reject every access token.
pub async fn mock_kakao_rejection(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/user/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(server)
        .await;
}

/// Logs in through `/auth/kakao` and returns the issued token pair.
pub async fn login(app: &TestApp, kakao_access_token: &str) -> LoginResponse {
    let response = app
        .client
        .post(app.url("/auth/kakao"))
        .json(&json!({ "access_token": kakao_access_token }))
        .send()
        .await
        .expect("Failed to execute login request");

    assert_eq!(response.status(), StatusCode::OK, "Login did not return 200");

    let body: ApiResponse<LoginResponse> = response
        .json()
        .await
        .expect("Failed to parse login response");
    assert!(body.success);

    body.data.expect("Login response carried no data")
}
