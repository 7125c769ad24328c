//! Session lifecycle: sign-in, registration, sign-out, and request
//! decoration. The renewal pipeline lives in [`renewal`].

mod renewal;
mod state;


use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use parley_common::{new_correlation_id, Event, EventBus};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::credentials::CredentialPair;
use crate::endpoints;
use crate::error::{SessionError, TransportError};
use crate::request::{ApiRequest, ApiResponse};
use crate::store::TokenStore;
use crate::transport::Transport;

use state::SessionState;

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tunables for a [`SessionManager`].
#[derive(Clone)]
pub struct SessionConfig {
    /// Upper bound on a single renewal call.
    pub renewal_timeout: Duration,
    /// Where lifecycle events are published.
    pub events: EventBus,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            renewal_timeout: Duration::from_secs(10),
            events: EventBus::default(),
        }
    }
}

impl SessionConfig {
    pub fn with_renewal_timeout(mut self, timeout: Duration) -> Self {
        self.renewal_timeout = timeout;
        self
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }
}

/// Form input for account creation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

impl Registration {
    fn validate(&self) -> Result<(), SessionError> {
        if self.username.trim().is_empty() {
            return Err(SessionError::Validation("username must not be blank".into()));
        }
        if self.email.trim().is_empty() {
            return Err(SessionError::Validation("email must not be blank".into()));
        }
        if self.password.is_empty() {
            return Err(SessionError::Validation("password must not be blank".into()));
        }
        if self.password != self.password_confirm {
            return Err(SessionError::Validation("passwords do not match".into()));
        }
        Ok(())
    }
}

/// Account record returned by the registration endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

/// Result of a registration whose account creation succeeded.
#[derive(Debug)]
pub enum RegisterOutcome {
    /// Account created and signed in.
    SignedIn { account: AccountRecord },
    /// Account created, but the follow-up sign-in failed. The account
    /// exists; the user can sign in later.
    CreatedSignInFailed {
        account: AccountRecord,
        reason: SessionError,
    },
}

impl RegisterOutcome {
    pub fn account(&self) -> &AccountRecord {
        match self {
            RegisterOutcome::SignedIn { account }
            | RegisterOutcome::CreatedSignInFailed { account, .. } => account,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self, RegisterOutcome::SignedIn { .. })
    }
}

#[derive(Deserialize)]
pub(crate) struct TokenGrant {
    pub(crate) access: String,
    #[serde(default)]
    pub(crate) refresh: Option<String>,
}

pub(crate) struct Inner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) state: SessionState,
    pub(crate) events: EventBus,
    pub(crate) renewal_timeout: Duration,
}

/// Owns the credential pair and runs every authenticated call through
/// the renewal pipeline. Cheap to clone; clones share one session.
#[derive(Clone)]
pub struct SessionManager {
    pub(crate) inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        transport: Arc<dyn Transport>,
        store: impl TokenStore + 'static,
        config: SessionConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                state: SessionState::new(Box::new(store)),
                events: config.events,
                renewal_timeout: config.renewal_timeout,
            }),
        }
    }

    /// Load the persisted pair into memory. Makes no network call; calling
    /// it again re-reads the same stored pair.
    pub fn initialize(&self) -> Result<(), SessionError> {
        self.inner.state.load()?;
        debug!(
            authenticated = self.is_authenticated(),
            "session initialized from storage"
        );
        Ok(())
    }

    /// Forget the in-memory session at shutdown. Storage is left intact so
    /// the next run can resume.
    pub fn teardown(&self) {
        self.inner.state.forget();
        debug!("session torn down");
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.credentials().is_authenticated()
    }

    pub fn can_renew(&self) -> bool {
        self.inner.state.credentials().can_renew()
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Exchange a username and password for a new credential pair.
    ///
    /// Sent outside the renewal pipeline: a 401 here means wrong
    /// credentials. On failure nothing is stored and the server's reason
    /// is returned.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), SessionError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(SessionError::Validation(
                "username and password are required".into(),
            ));
        }

        let request = ApiRequest::post(
            endpoints::LOGIN,
            json!({ "username": username, "password": password }),
        );
        let grant: TokenGrant = self
            .send_unauthenticated(&request)
            .await?
            .error_for_status()?
            .json()?;

        self.inner
            .state
            .install(CredentialPair::new(grant.access, grant.refresh))?;

        info!(%username, "signed in");
        self.inner.events.publish(Event::SessionStarted {
            username: username.to_string(),
        });
        Ok(())
    }

    /// Create an account, then sign in with it.
    ///
    /// `Err` means the account was not created. A created account whose
    /// sign-in failed is reported as [`RegisterOutcome::CreatedSignInFailed`].
    pub async fn register(
        &self,
        registration: &Registration,
    ) -> Result<RegisterOutcome, SessionError> {
        registration.validate()?;

        let request = ApiRequest::post(
            endpoints::REGISTER,
            json!({
                "username": registration.username,
                "email": registration.email,
                "password": registration.password,
            }),
        );
        let response = self.send_unauthenticated(&request).await?.error_for_status()?;
        let account = response.json::<AccountRecord>().unwrap_or_else(|e| {
            debug!("registration response without account record: {e}");
            AccountRecord {
                id: None,
                username: registration.username.clone(),
                email: registration.email.clone(),
            }
        });
        info!(username = %account.username, "account created");

        match self
            .authenticate(&registration.username, &registration.password)
            .await
        {
            Ok(()) => Ok(RegisterOutcome::SignedIn { account }),
            Err(reason) => {
                warn!(username = %account.username, "account created but sign-in failed: {reason}");
                Ok(RegisterOutcome::CreatedSignInFailed { account, reason })
            }
        }
    }

    /// Drop the credential pair locally. Nothing is revoked server-side.
    pub fn end_session(&self) {
        let had_credentials = self.inner.state.clear();
        if had_credentials {
            info!("signed out");
        }
        self.inner.events.publish(Event::SessionEnded);
    }

    /// Attach the current access token. Without one the request is
    /// returned as-is and the backend will reject it.
    pub fn decorate(&self, request: ApiRequest) -> ApiRequest {
        match self.inner.state.credentials().access_token() {
            Some(token) => request.with_bearer(token),
            None => request,
        }
    }

    async fn send_unauthenticated(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let cid = new_correlation_id();
        debug!(%cid, method = %request.method, path = %request.path, "sending request");
        let response = self.inner.transport.send(request).await;
        match &response {
            Ok(r) => debug!(%cid, status = r.status, "response received"),
            Err(e) => warn!(%cid, path = %request.path, "request failed: {e}"),
        }
        response
    }
}
