//! HTTP pipeline shared by every store and fetcher.
//!
//! Each call gets an `Authorization: Bearer …` header (session token when a
//! user is signed in, otherwise the configured read token), an `x-request-id`,
//! and start/finish log lines. Responses are checked against the
//! `{success, message, data}` envelope before they reach a caller.

use std::{sync::Arc, time::Instant};

use reqwest::{Method, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use url::Url;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    error::{AppError, AppResult},
    response::ApiResponse,
};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    base_url: Url,
    catalog_url: Url,
    read_token: Option<SecretString>,
    session_token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .default_headers(Self::default_headers())
            .build()?;
        Ok(Self {
            inner: Arc::new(ApiClientInner {
                http,
                base_url: config.api_base_url.clone(),
                catalog_url: config.catalog_base_url.clone(),
                read_token: config.read_access_token.clone(),
                session_token: RwLock::new(None),
            }),
        })
    }

    fn default_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers
    }

    pub fn endpoint(&self, path: &str) -> AppResult<Url> {
        join(&self.inner.base_url, path)
    }

    pub fn catalog_endpoint(&self, path: &str) -> AppResult<Url> {
        join(&self.inner.catalog_url, path)
    }

    pub async fn set_session_token(&self, token: Option<String>) {
        *self.inner.session_token.write().await = token.map(SecretString::from);
    }

    pub async fn has_session_token(&self) -> bool {
        self.inner.session_token.read().await.is_some()
    }

    async fn bearer(&self) -> Option<String> {
        if let Some(token) = self.inner.session_token.read().await.as_ref() {
            return Some(token.expose_secret().to_string());
        }
        self.inner
            .read_token
            .as_ref()
            .map(|t| t.expose_secret().to_string())
    }

    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> AppResult<ApiResponse<T>> {
        self.send(Method::GET, url, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> AppResult<ApiResponse<T>> {
        self.send(Method::POST, url, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> AppResult<ApiResponse<T>> {
        self.send(Method::PUT, url, Some(serde_json::to_value(body)?))
            .await
    }

    pub async fn delete(&self, url: Url) -> AppResult<ApiResponse<serde_json::Value>> {
        self.send(Method::DELETE, url, None).await
    }

    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> AppResult<ApiResponse<T>> {
        let value = self.send_value(method, url, body).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Whole response body, after status and envelope checks.
    pub async fn send_value(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> AppResult<serde_json::Value> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = self
            .inner
            .http
            .request(method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = self.bearer().await {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::info!(
            request_id = %request_id,
            method = %method,
            url = %url,
            "request started"
        );
        let started = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(request_id = %request_id, error = %err, "request failed");
                return Err(err.into());
            }
        };
        let status = response.status();
        let text = response.text().await?;
        tracing::info!(
            request_id = %request_id,
            status = %status,
            ms = %started.elapsed().as_millis(),
            "request finished"
        );

        check_envelope(status, &text)
    }
}

fn join(base: &Url, path: &str) -> AppResult<Url> {
    let raw = format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid endpoint {raw}: {e}")))
}

fn check_envelope(status: StatusCode, text: &str) -> AppResult<serde_json::Value> {
    let fallback = || status.canonical_reason().unwrap_or("request failed").to_string();

    let value = if text.trim().is_empty() {
        serde_json::json!({})
    } else {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(AppError::Api {
                    status,
                    message: fallback(),
                });
            }
            Err(err) => return Err(err.into()),
        }
    };

    let rejected = value.get("success").and_then(serde_json::Value::as_bool) == Some(false);
    if !status.is_success() || rejected {
        let message = value
            .get("message")
            .and_then(serde_json::Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(fallback);
        tracing::warn!(status = %status, message = %message, "api rejected request");
        return Err(AppError::Api { status, message });
    }

    Ok(value)
}
