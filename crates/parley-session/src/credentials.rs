//! The access/refresh token pair.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Short-lived access token plus the longer-lived refresh token used to
/// renew it.
///
/// A pair without an access token is unauthenticated. A pair with an
/// access token but no refresh token is usable until the access token
/// expires and cannot be renewed afterwards.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPair {
    #[serde(rename = "access_token", default, skip_serializing_if = "Option::is_none")]
    access: Option<String>,
    #[serde(rename = "refresh_token", default, skip_serializing_if = "Option::is_none")]
    refresh: Option<String>,
}

impl fmt::Debug for CredentialPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |token: &Option<String>| token.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("CredentialPair")
            .field("access", &redact(&self.access))
            .field("refresh", &redact(&self.refresh))
            .finish()
    }
}

impl CredentialPair {
    pub fn new(access: impl Into<String>, refresh: Option<String>) -> Self {
        Self {
            access: Some(access.into()),
            refresh,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.access.as_deref().is_some_and(|token| !token.is_empty())
    }

    pub fn can_renew(&self) -> bool {
        self.refresh.as_deref().is_some_and(|token| !token.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.access.is_none() && self.refresh.is_none()
    }

    pub(crate) fn access_token(&self) -> Option<&str> {
        self.access.as_deref().filter(|token| !token.is_empty())
    }

    pub(crate) fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|token| !token.is_empty())
    }

    /// The pair after a successful renewal. The refresh token is only
    /// replaced when the server rotated it.
    pub(crate) fn renewed(&self, access: String, rotated_refresh: Option<String>) -> Self {
        Self {
            access: Some(access),
            refresh: rotated_refresh.or_else(|| self.refresh.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_pair_is_unauthenticated() {
        let pair = CredentialPair::empty();
        assert!(!pair.is_authenticated());
        assert!(!pair.can_renew());
        assert!(pair.is_empty());
    }

    #[test]
    fn access_without_refresh_is_authenticated_but_not_renewable() {
        let pair = CredentialPair::new("A1", None);
        assert!(pair.is_authenticated());
        assert!(!pair.can_renew());
    }

    #[test]
    fn renewal_keeps_refresh_token_unless_rotated() {
        let pair = CredentialPair::new("A1", Some("R1".into()));

        let kept = pair.renewed("A2".into(), None);
        assert_eq!(kept.access_token(), Some("A2"));
        assert_eq!(kept.refresh_token(), Some("R1"));

        let rotated = pair.renewed("A2".into(), Some("R2".into()));
        assert_eq!(rotated.refresh_token(), Some("R2"));
    }

    #[test]
    fn debug_redacts_tokens() {
        let pair = CredentialPair::new("secret-access", Some("secret-refresh".into()));
        let debug = format!("{pair:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn serializes_under_fixed_key_names() {
        let pair = CredentialPair::new("A1", Some("R1".into()));
        let json = serde_json::to_value(&pair).unwrap();
        assert_eq!(json["access_token"], "A1");
        assert_eq!(json["refresh_token"], "R1");

        let parsed: CredentialPair = serde_json::from_str(r#"{"access_token":"A1"}"#).unwrap();
        assert!(parsed.is_authenticated());
        assert!(!parsed.can_renew());
    }
}
