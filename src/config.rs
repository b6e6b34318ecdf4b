use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

use dotenvy::dotenv;

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    pub addr: String,
    pub port: u16,
    pub cors_origin: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_minutes")]
    pub access_token_expires_minutes: i64,
    #[serde(default = "default_refresh_token_days")]
    pub refresh_token_expires_days: i64,
}

fn default_access_token_minutes() -> i64 {
    30
}

// Refresh tokens live for two weeks.
fn default_refresh_token_days() -> i64 {
    14
}

#[derive(Debug, Deserialize, Clone)]
pub struct KakaoConfig {
    /// User-info endpoint of the Kakao API. Overridden in tests to point at a
    /// local mock server.
    #[serde(default = "default_kakao_user_info_url")]
    pub user_info_url: String,
}

fn default_kakao_user_info_url() -> String {
    "https://kapi.kakao.com/v2/user/me".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub web: WebConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub kakao: KakaoConfig,
}

impl AppConfig {
    /// Loads configuration from `Config.toml` (non-sensitive defaults) merged
    /// with `APP_`-prefixed environment variables, e.g. `APP_JWT__SECRET` or
    /// `APP_DATABASE__URL`. A `.env` file is honored if present.
    pub fn from_env() -> Result<Self, figment::Error> {
        dotenv().ok();

        let config: AppConfig = Figment::new()
            .merge(Toml::file("Config.toml"))
            .merge(Env::prefixed("APP_").split("__"))
            .extract()?;

        // Deliberately not logging the config itself: it carries the JWT secret.
        tracing::info!(
            "Configuration loaded (listening on {}:{})",
            config.web.addr,
            config.web.port
        );

        Ok(config)
    }
}
