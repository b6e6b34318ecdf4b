use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::KakaoConfig;
use crate::error::{AppError, AuthError};

/// Profile data we keep from the Kakao user-info response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KakaoUser {
    pub kakao_id: String,
    pub nickname: Option<String>,
}

#[derive(Deserialize)]
struct UserInfoResponse {
    id: i64,
    properties: Option<UserInfoProperties>,
}

#[derive(Deserialize)]
struct UserInfoProperties {
    nickname: Option<String>,
}

/// Client for the Kakao user-info API (`/v2/user/me`). The access token is the
/// one the mobile/web client obtained from Kakao; we only ever forward it.
#[derive(Debug, Clone)]
pub struct KakaoClient {
    http: reqwest::Client,
    user_info_url: String,
}

impl KakaoClient {
    pub fn new(config: &KakaoConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to build the Kakao HTTP client");

        Self {
            http,
            user_info_url: config.user_info_url.clone(),
        }
    }

    /// Fetches the profile behind a Kakao access token. A 401/403 from Kakao
    /// means the token was rejected; any other failure is an upstream problem
    /// rather than the caller's.
    pub async fn get_user_info(&self, access_token: &str) -> Result<KakaoUser, AppError> {
        let response = self
            .http
            .get(&self.user_info_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AuthError::KakaoRejected.into());
        }
        if !status.is_success() {
            return Err(AppError::KakaoStatus(status));
        }

        let body: UserInfoResponse = response.json().await?;

        Ok(KakaoUser {
            // Kakao ids are numeric; we persist them as text.
            kakao_id: body.id.to_string(),
            nickname: body.properties.and_then(|p| p.nickname),
        })
    }
}
