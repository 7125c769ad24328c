use parley_chat::ChatError;
use parley_common::{ConfigError, ParleyError};
use parley_session::SessionError;

/// Failure of one CLI command. Printed via `Display` before exiting
/// non-zero.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    App(#[from] ParleyError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Chat(#[from] ChatError),
}

impl CliError {
    /// True when the user has to sign in (again) before retrying.
    pub fn needs_login(&self) -> bool {
        match self {
            CliError::Session(e) => e.is_unauthenticated(),
            CliError::Chat(e) => e.is_unauthenticated(),
            CliError::App(_) => false,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::App(e.into())
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::App(e.into())
    }
}
