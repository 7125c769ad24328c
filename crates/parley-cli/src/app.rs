//! Wiring from configuration to a ready session and controllers.

use std::sync::Arc;

use parley_chat::{ConversationController, ProviderSettings};
use parley_common::{Event, ParleyError};
use parley_config::ParleyConfig;
use parley_session::{
    FileTokenStore, HttpTransport, MemoryTokenStore, SessionConfig, SessionManager, TokenStore,
    Transport,
};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::CliError;

pub struct App {
    pub session: SessionManager,
    pub chat: ConversationController,
    pub settings: ProviderSettings,
}

impl App {
    /// Build the app against the configured backend. Credentials live in
    /// the configured file unless `ephemeral`.
    pub fn build(config: &ParleyConfig, ephemeral: bool) -> Result<Self, CliError> {
        let transport = HttpTransport::new(
            &config.api.base_url,
            config.api.connect_timeout(),
            config.api.request_timeout(),
        )
        .map_err(|e| ParleyError::Other(format!("invalid backend address: {e}")))?;
        info!(base_url = %transport.base_url(), "backend configured");

        let session_config =
            SessionConfig::default().with_renewal_timeout(config.api.renewal_timeout());
        let transport: Arc<dyn Transport> = Arc::new(transport);

        if ephemeral {
            debug!("credentials kept in memory only");
            Self::from_parts(transport, MemoryTokenStore::new(), session_config)
        } else {
            let path = config.storage.resolve_credentials_path()?;
            debug!(path = %path.display(), "credentials file");
            Self::from_parts(transport, FileTokenStore::new(path), session_config)
        }
    }

    pub fn from_parts(
        transport: Arc<dyn Transport>,
        store: impl TokenStore + 'static,
        config: SessionConfig,
    ) -> Result<Self, CliError> {
        let session = SessionManager::new(transport, store, config);
        session.initialize()?;
        Ok(Self {
            chat: ConversationController::new(session.clone()),
            settings: ProviderSettings::new(session.clone()),
            session,
        })
    }

    /// Tell the user when the session expires underneath them.
    pub fn watch_session(&self) -> JoinHandle<()> {
        let mut events = self.session.events().subscribe();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(Event::SessionExpired) => {
                        eprintln!("Your session has expired. Run `parley login <username>` to sign in again.");
                    }
                    Ok(event) => debug!(?event, "session event"),
                    Err(RecvError::Lagged(missed)) => debug!(missed, "event listener lagged"),
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use parley_session::mock::MockTransport;
    use parley_session::{ApiResponse, CredentialPair};

    use super::*;

    #[tokio::test]
    async fn controllers_share_the_session() {
        let transport = Arc::new(MockTransport::new(|_| Ok(ApiResponse::ok(Default::default()))));
        let store = Arc::new(MemoryTokenStore::with_pair(CredentialPair::new(
            "A1",
            Some("R1".into()),
        )));
        let app = App::from_parts(transport, store.clone(), SessionConfig::default()).unwrap();

        assert!(app.chat.session().is_authenticated());
        app.session.end_session();
        assert!(!app.chat.session().is_authenticated());
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn build_rejects_unusable_backend_address() {
        let mut config = ParleyConfig::default();
        config.api.base_url = "not a url".into();

        assert!(App::build(&config, true).is_err());
    }
}
