//! Transport-neutral request and response model.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ServerErrors, SessionError, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

/// A logical backend call. `path` is relative to the transport's base URL.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    bearer: Option<String>,
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("body", &self.body)
            .field("bearer", &self.bearer.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            bearer: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    /// Access token attached to this request, if any.
    pub fn bearer(&self) -> Option<&str> {
        self.bearer.as_deref()
    }

    /// Value of the `Authorization` header this request carries.
    pub fn authorization(&self) -> Option<String> {
        self.bearer.as_ref().map(|token| format!("Bearer {token}"))
    }
}

/// Status plus decoded JSON body (`null` when the body was empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    pub fn unauthorized() -> Self {
        Self::new(
            401,
            serde_json::json!({"detail": "Given token not valid for any token type"}),
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The backend's signal that the presented access token is invalid or
    /// expired.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Turn a non-success status into [`SessionError::Rejected`], keeping
    /// the server's messages.
    pub fn error_for_status(self) -> Result<Self, SessionError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SessionError::Rejected(ServerErrors::from_body(
                self.status,
                &self.body,
            )))
        }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, TransportError> {
        serde_json::from_value(self.body.clone()).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn authorization_header_uses_bearer_scheme() {
        let request = ApiRequest::get("chat/").with_bearer("A1");
        assert_eq!(request.bearer(), Some("A1"));
        assert_eq!(request.authorization().as_deref(), Some("Bearer A1"));
        assert!(ApiRequest::get("chat/").authorization().is_none());
    }

    #[test]
    fn debug_redacts_bearer() {
        let request = ApiRequest::get("chat/").with_bearer("very-secret");
        assert!(!format!("{request:?}").contains("very-secret"));
    }

    #[test]
    fn error_for_status_keeps_server_messages() {
        let response = ApiResponse::new(400, json!({"message": ["This field may not be blank."]}));
        let err = response.error_for_status().unwrap_err();
        let errors = err.server_errors().unwrap();
        assert_eq!(errors.status, 400);
        assert_eq!(errors.field("message").len(), 1);
    }

    #[test]
    fn success_statuses_pass_through() {
        assert!(ApiResponse::created(json!({})).error_for_status().is_ok());
        assert!(ApiResponse::new(204, Value::Null).is_success());
        assert!(!ApiResponse::unauthorized().is_success());
        assert!(ApiResponse::unauthorized().is_unauthorized());
    }

    #[test]
    fn json_decode_failure_is_transport_error() {
        let response = ApiResponse::ok(json!({"unexpected": true}));
        #[derive(Debug, serde::Deserialize)]
        #[allow(dead_code)]
        struct Needs {
            id: i64,
        }
        let err = response.json::<Needs>().unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
