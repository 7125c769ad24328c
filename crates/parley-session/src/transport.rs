//! Network seam: the [`Transport`] trait and its reqwest implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;
use crate::request::{ApiRequest, ApiResponse, Method};

/// Sends one logical request and returns whatever the backend answered.
///
/// Implementations report `Err` only when no response arrived at all;
/// every HTTP status, including 401, is an `Ok` response.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// JSON-over-HTTP transport backed by `reqwest`.
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(request_timeout)
            .build()
            .map_err(|e| TransportError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URL of an endpoint path such as `chat/clear/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
    }
}

/// Parse the base URL and make sure it ends with `/` so relative paths
/// are appended instead of replacing the last segment.
fn normalize_base_url(raw: &str) -> Result<Url, TransportError> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&with_slash).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint(&request.path)?;
        let mut builder = match request.method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Delete => self.http.delete(url),
        };
        if let Some(authorization) = request.authorization() {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        debug!(
            method = %request.method,
            path = %request.path,
            status,
            bytes = bytes.len(),
            "HTTP response"
        );

        Ok(ApiResponse::new(status, decode_body(&bytes)))
    }
}

/// JSON bodies decode as-is; an empty body is `null`; anything else
/// (an HTML error page, plain text) becomes a truncated string.
fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes).unwrap_or_else(|_| {
        let text = String::from_utf8_lossy(bytes);
        Value::String(text.chars().take(200).collect())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(base, Duration::from_secs(1), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn joins_paths_onto_base_url() {
        let t = transport("http://localhost:8000/api/");
        assert_eq!(
            t.endpoint("chat/clear/").unwrap().as_str(),
            "http://localhost:8000/api/chat/clear/"
        );
        assert_eq!(
            t.endpoint("/token/refresh/").unwrap().as_str(),
            "http://localhost:8000/api/token/refresh/"
        );
    }

    #[test]
    fn base_url_without_trailing_slash_keeps_last_segment() {
        let t = transport("https://chat.example.com/api");
        assert_eq!(t.base_url().as_str(), "https://chat.example.com/api/");
        assert_eq!(
            t.endpoint("token/").unwrap().as_str(),
            "https://chat.example.com/api/token/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let result = HttpTransport::new("not a url", Duration::from_secs(1), Duration::from_secs(1));
        assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
    }

    #[test]
    fn decodes_bodies() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
        assert_eq!(decode_body(br#"{"id": 1}"#)["id"], 1);
        assert_eq!(
            decode_body(b"<html>Bad Gateway</html>"),
            Value::String("<html>Bad Gateway</html>".into())
        );
    }
}
