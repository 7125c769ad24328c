use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

/// No usable response came back from the backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("could not decode response: {0}")]
    Decode(String),
}

/// Local credential persistence failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("credential storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored credentials are corrupt: {0}")]
    Corrupt(String),
}

/// Why a token renewal failed. Cloneable because every caller waiting on
/// the same renewal receives the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenewalError {
    #[error("no refresh token available")]
    NoRefreshToken,

    #[error("refresh token rejected (HTTP {status})")]
    Rejected { status: u16 },

    #[error("renewal request failed: {0}")]
    Transport(String),

    #[error("renewal timed out")]
    Timeout,

    #[error("malformed renewal response: {0}")]
    Malformed(String),

    #[error("session changed while renewing")]
    Superseded,
}

/// Classified reason carried by every failing session operation.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    /// No valid credentials; the user has to sign in again.
    #[error("not signed in")]
    Unauthenticated,

    /// The backend answered with a non-success status.
    #[error("{0}")]
    Rejected(ServerErrors),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, SessionError::Unauthenticated)
    }

    pub fn server_errors(&self) -> Option<&ServerErrors> {
        match self {
            SessionError::Rejected(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Error payload of a non-success response, with field-level messages
/// kept apart from general ones.
///
/// Accepts `{"detail": "..."}`, `{"error": "..."}`, `{"non_field_errors": [...]}`,
/// `{"<field>": ["...", ...]}` and bare strings.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerErrors {
    pub status: u16,
    general: Vec<String>,
    fields: BTreeMap<String, Vec<String>>,
}

const GENERAL_KEYS: [&str; 3] = ["detail", "error", "non_field_errors"];

impl ServerErrors {
    pub fn from_body(status: u16, body: &Value) -> Self {
        let mut errors = Self {
            status,
            ..Self::default()
        };
        match body {
            Value::Object(map) => {
                for (key, value) in map {
                    let messages = messages_of(value);
                    if GENERAL_KEYS.contains(&key.as_str()) {
                        errors.general.extend(messages);
                    } else {
                        errors.fields.insert(key.clone(), messages);
                    }
                }
            }
            Value::Null => {}
            other => errors.general.extend(messages_of(other)),
        }
        errors
    }

    /// Messages that are not tied to a form field.
    pub fn general(&self) -> &[String] {
        &self.general
    }

    /// Messages reported against one field, e.g. `"password"`.
    pub fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(name, messages)| (name.as_str(), messages.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.fields.is_empty()
    }

    /// Every message, general ones first, joined with `". "`.
    pub fn summary(&self) -> String {
        if self.is_empty() {
            return format!("request failed (HTTP {})", self.status);
        }
        self.general
            .iter()
            .chain(self.fields.values().flatten())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(". ")
    }
}

impl fmt::Display for ServerErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message.clone()],
        Value::Array(items) => items.iter().flat_map(messages_of).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_is_a_general_message() {
        let errors = ServerErrors::from_body(
            401,
            &json!({"detail": "No active account found with the given credentials"}),
        );
        assert_eq!(
            errors.summary(),
            "No active account found with the given credentials"
        );
        assert_eq!(errors.general().len(), 1);
        assert_eq!(errors.fields().count(), 0);
    }

    #[test]
    fn field_messages_are_preserved() {
        let errors = ServerErrors::from_body(
            400,
            &json!({
                "username": ["A user with this username already exists."],
                "password": ["This password is too short.", "This password is too common."]
            }),
        );
        assert_eq!(errors.field("password").len(), 2);
        assert_eq!(
            errors.field("username"),
            ["A user with this username already exists.".to_string()]
        );
        assert!(errors.field("email").is_empty());
        assert_eq!(
            errors.summary(),
            "This password is too short. This password is too common. \
             A user with this username already exists."
        );
    }

    #[test]
    fn bare_string_body_becomes_general_message() {
        let errors = ServerErrors::from_body(502, &json!("Bad Gateway"));
        assert_eq!(errors.summary(), "Bad Gateway");
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let errors = ServerErrors::from_body(500, &Value::Null);
        assert!(errors.is_empty());
        assert_eq!(errors.summary(), "request failed (HTTP 500)");
    }

    #[test]
    fn session_error_display() {
        assert_eq!(SessionError::Unauthenticated.to_string(), "not signed in");
        assert_eq!(
            SessionError::Validation("message must not be blank".into()).to_string(),
            "message must not be blank"
        );
        let err: SessionError = TransportError::Timeout.into();
        assert_eq!(err.to_string(), "request timed out");
        assert!(SessionError::Unauthenticated.is_unauthenticated());
    }

    #[test]
    fn renewal_error_display() {
        assert_eq!(
            RenewalError::Rejected { status: 401 }.to_string(),
            "refresh token rejected (HTTP 401)"
        );
        assert_eq!(RenewalError::Timeout.to_string(), "renewal timed out");
    }
}
