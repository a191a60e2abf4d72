use crate::config::Config;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A failed GitHub API call: the HTTP status and the remote message.
///
/// Transport-level failures (connection refused, TLS, malformed response
/// bodies) are folded in with a 500 status. Every operation is attempted
/// exactly once; no call site retries.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("GitHub API error (HTTP {status}): {message}")]
pub struct RemoteError {
    pub status: StatusCode,
    pub message: String,
}

impl RemoteError {
    pub fn is_not_found(&self) -> bool {
        self.status == StatusCode::NOT_FOUND
    }

    fn transport(err: reqwest::Error) -> Self {
        RemoteError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

pub fn build_client(cfg: &Config) -> Result<Client, RemoteError> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&cfg.user_agent).map_err(|e| RemoteError {
            status: StatusCode::BAD_REQUEST,
            message: format!("invalid user agent: {}", e),
        })?,
    );
    // No request timeout: the transport default applies.
    Client::builder()
        .default_headers(default_headers)
        .use_rustls_tls()
        .build()
        .map_err(RemoteError::transport)
}

fn auth_header(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {}", token)).expect("valid header")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateMeta {
    pub remaining: Option<i32>,
    pub used: Option<i32>,
    pub reset_at: Option<String>,
}

pub fn extract_rate_from_rest(headers: &HeaderMap) -> RateMeta {
    let remaining = headers
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let used = headers
        .get("x-ratelimit-used")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i32>().ok());
    let reset_at = headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|epoch| chrono::DateTime::<chrono::Utc>::from_timestamp(epoch, 0))
        .map(|t| t.to_rfc3339());
    RateMeta {
        remaining,
        used,
        reset_at,
    }
}

fn log_rate(headers: &HeaderMap) {
    let rate = extract_rate_from_rest(headers);
    if let Some(remaining) = rate.remaining {
        debug!(
            "rate limit: {} remaining (resets {})",
            remaining,
            rate.reset_at.as_deref().unwrap_or("unknown")
        );
    }
}

// GitHub error bodies are usually {"message": "..."}; fall back to raw text.
fn error_message(body: String) -> String {
    #[derive(Deserialize)]
    struct ApiError {
        message: String,
    }
    match serde_json::from_str::<ApiError>(&body) {
        Ok(e) => e.message,
        Err(_) => body,
    }
}

async fn dispatch(
    client: &Client,
    cfg: &Config,
    token: &str,
    method: Method,
    path: &str,
    body: Option<serde_json::Value>,
) -> Result<reqwest::Response, RemoteError> {
    let url = format!("{}{}", cfg.api_url, path);
    let mut req = client
        .request(method, &url)
        .header(AUTHORIZATION, auth_header(token))
        .header("X-GitHub-Api-Version", &cfg.api_version)
        .header(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
    if let Some(b) = body {
        req = req.json(&b);
    }
    let res = req.send().await.map_err(RemoteError::transport)?;
    log_rate(res.headers());
    let status = res.status();
    if status.is_success() {
        return Ok(res);
    }
    let text = res.text().await.unwrap_or_default();
    Err(RemoteError {
        status,
        message: error_message(text),
    })
}

pub async fn get_json<T: DeserializeOwned>(
    client: &Client,
    cfg: &Config,
    token: &str,
    path: &str,
) -> Result<T, RemoteError> {
    let res = dispatch(client, cfg, token, Method::GET, path, None).await?;
    res.json::<T>().await.map_err(RemoteError::transport)
}

pub async fn send_json<B: Serialize, T: DeserializeOwned>(
    client: &Client,
    cfg: &Config,
    token: &str,
    method: Method,
    path: &str,
    body: &B,
) -> Result<T, RemoteError> {
    let body = serde_json::to_value(body).map_err(|e| RemoteError {
        status: StatusCode::BAD_REQUEST,
        message: e.to_string(),
    })?;
    let res = dispatch(client, cfg, token, method, path, Some(body)).await?;
    res.json::<T>().await.map_err(RemoteError::transport)
}

/// Like [`send_json`] for endpoints whose success response carries no body
/// worth reading (workflow dispatch returns 204, the contents API returns a
/// commit object we discard).
pub async fn send_unit<B: Serialize>(
    client: &Client,
    cfg: &Config,
    token: &str,
    method: Method,
    path: &str,
    body: &B,
) -> Result<(), RemoteError> {
    let body = serde_json::to_value(body).map_err(|e| RemoteError {
        status: StatusCode::BAD_REQUEST,
        message: e.to_string(),
    })?;
    dispatch(client, cfg, token, method, path, Some(body)).await?;
    Ok(())
}

pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encode each segment of a repository file path, keeping the
/// separators so the contents API sees the intended nesting.
pub fn encode_file_path(path: &str) -> String {
    path.split('/')
        .map(|s| encode_path_segment(s))
        .collect::<Vec<_>>()
        .join("/")
}
