use parley_session::{ServerErrors, SessionError};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The background delivery task died before reconciling.
    #[error("message delivery interrupted: {0}")]
    Interrupted(String),
}

impl ChatError {
    /// The session ended and the user has to sign in again.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, ChatError::Session(e) if e.is_unauthenticated())
    }

    pub fn server_errors(&self) -> Option<&ServerErrors> {
        match self {
            ChatError::Session(e) => e.server_errors(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthenticated_is_detected_through_session_error() {
        assert!(ChatError::Session(SessionError::Unauthenticated).is_unauthenticated());
        assert!(!ChatError::Validation("blank".into()).is_unauthenticated());
    }

    #[test]
    fn session_error_display_is_transparent() {
        let err = ChatError::from(SessionError::Unauthenticated);
        assert_eq!(err.to_string(), "not signed in");
    }
}
