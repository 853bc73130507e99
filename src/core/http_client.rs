use std::time::Duration;

use async_trait::async_trait;
use dlmate_core::models::settings::ClientConfig;
use dlmate_core::{DlMateError, Platform};
use thiserror::Error;

const ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Form(Vec<(String, String)>),
    Json(serde_json::Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_form(url: impl Into<String>, fields: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(RequestBody::Form(fields)),
        }
    }

    pub fn post_json(url: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Vec::new(),
            body: Some(RequestBody::Json(body)),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
}

impl HttpResponse {
    pub fn json(&self, platform: Platform) -> Result<serde_json::Value, DlMateError> {
        serde_json::from_str(&self.body)
            .map_err(|e| DlMateError::malformed(platform, format!("invalid JSON: {}", e)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status}")]
    Status { status: u16, body: String },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl HttpError {
    pub fn into_upstream(self, platform: Platform) -> DlMateError {
        match self {
            HttpError::Status { status, .. } => {
                DlMateError::upstream(platform, Some(status), format!("HTTP {}", status))
            }
            HttpError::InvalidRequest(detail) => DlMateError::malformed(platform, detail),
            other => DlMateError::upstream(platform, None, other.to_string()),
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else if e.is_builder() {
            HttpError::InvalidRequest(e.to_string())
        } else {
            HttpError::Network(e.to_string())
        }
    }
}

/// Transport seam used by every extractor. Non-2xx responses are errors.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError>;
}

pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(config: &ClientConfig) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(ACCEPT),
        );

        let builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(config.timeout())
            .connect_timeout(config.timeout().min(Duration::from_secs(15)));

        let client = apply_proxy(builder, config.proxy.as_deref())
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[http] failed to build client, using defaults: {}", e);
                reqwest::Client::default()
            });

        Self { client }
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

pub fn apply_proxy(builder: reqwest::ClientBuilder, proxy: Option<&str>) -> reqwest::ClientBuilder {
    let Some(proxy_url) = proxy.filter(|p| !p.trim().is_empty()) else {
        return builder;
    };
    match reqwest::Proxy::all(proxy_url) {
        Ok(p) => builder.proxy(p),
        Err(e) => {
            tracing::warn!("[http] invalid proxy URL: {}", e);
            builder
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttp {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Form(fields)) => builder.form(fields),
            Some(RequestBody::Json(value)) => builder.json(value),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await?;

        tracing::debug!("[http] {} -> {}, {} bytes", request.url, status, body.len());

        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(HttpResponse {
            status: status.as_u16(),
            url,
            body,
        })
    }
}
