use crate::domain::model::{
    AccessToken, EntityId, LoginStep1Response, LoginStep2Response, TutorialDocument,
};
use crate::domain::ports::{AuthService, ConfigProvider, TrainingSource};
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("yappa-client/", env!("CARGO_PKG_VERSION"));

/// REST 後端的 HTTP 用戶端。
///
/// 不持有預設的 Authorization header；需要授權的請求由呼叫端逐次傳入 token。
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_settings(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
            DEFAULT_USER_AGENT,
        )
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        Self::with_settings(
            config.api_base_url(),
            Duration::from_secs(config.timeout_seconds()),
            config.user_agent(),
        )
    }

    pub fn with_settings(base_url: &str, timeout: Duration, user_agent: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| AppError::InvalidConfigValueError {
            field: "api.base_url".to_string(),
            value: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::ConfigError {
                message: format!("'{}' cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response> {
        tracing::debug!("Making API request to: {}", path);
        // 查詢字串可能帶有密碼或 PIN，錯誤中不保留 URL
        let response = request.send().await.map_err(|e| {
            let e = e.without_url();
            tracing::warn!("API request to {} failed: {}", path, e);
            AppError::Http(e)
        })?;
        tracing::debug!("API response status: {}", response.status());
        Ok(response)
    }
}

fn authorize(request: RequestBuilder, token: Option<&AccessToken>) -> RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token.as_str()),
        None => request,
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Http(e.without_url()))?;

    if !status.is_success() {
        return Err(AppError::Api {
            status: status.as_u16(),
            detail: extract_detail(&body),
        });
    }

    Ok(serde_json::from_str(&body)?)
}

async fn ensure_success(response: Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    Err(AppError::Api {
        status: status.as_u16(),
        detail: extract_detail(&body),
    })
}

/// 讀取後端錯誤訊息：`detail` 可能是字串或 `[{ "msg": ... }]`，
/// 其次才看 `message` 與 `error`
pub fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;

    for key in ["detail", "message", "error"] {
        match value.get(key) {
            Some(Value::String(text)) if !text.trim().is_empty() => {
                return Some(text.trim().to_string());
            }
            Some(Value::Array(items)) => {
                let messages: Vec<&str> = items
                    .iter()
                    .filter_map(|item| item.get("msg").and_then(Value::as_str).or(item.as_str()))
                    .collect();
                if !messages.is_empty() {
                    return Some(messages.join("; "));
                }
            }
            _ => {}
        }
    }

    None
}

#[async_trait]
impl AuthService for ApiClient {
    async fn login_step1(&self, username: &str, password: &str) -> Result<LoginStep1Response> {
        let url = self.endpoint(&["login", "step1"])?;
        let request = self
            .client
            .post(url)
            .query(&[("username", username), ("password", password)]);
        let response = self.send(request, "/login/step1").await?;
        read_json(response).await
    }

    async fn login_step2(
        &self,
        merchant_id: &EntityId,
        clerk_id: &EntityId,
        pin: &str,
    ) -> Result<LoginStep2Response> {
        let url = self.endpoint(&["login", "step2"])?;
        let request = self.client.post(url).query(&[
            ("merchant_id", merchant_id.as_str()),
            ("clerk_id", clerk_id.as_str()),
            ("pin", pin),
        ]);
        let response = self.send(request, "/login/step2").await?;
        read_json(response).await
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        let url = self.endpoint(&["forgot-password"])?;
        let request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "email": email }));
        let response = self.send(request, "/forgot-password").await?;
        ensure_success(response).await
    }

    async fn reset_password(&self, email: &str, reset_code: &str, new_password: &str) -> Result<()> {
        let url = self.endpoint(&["reset-password"])?;
        let request = self.client.post(url).json(&serde_json::json!({
            "email": email,
            "reset_code": reset_code,
            "new_password": new_password,
        }));
        let response = self.send(request, "/reset-password").await?;
        ensure_success(response).await
    }
}

#[async_trait]
impl TrainingSource for ApiClient {
    async fn fetch_training(
        &self,
        id: &str,
        token: Option<&AccessToken>,
    ) -> Result<TutorialDocument> {
        let id = id.trim();
        if id.is_empty() {
            return Err(AppError::validation("training id cannot be empty"));
        }

        let url = self.endpoint(&["training", id])?;
        let request = authorize(self.client.get(url), token);
        let response = self.send(request, &format!("/training/{}", id)).await?;
        read_json(response).await
    }
}
