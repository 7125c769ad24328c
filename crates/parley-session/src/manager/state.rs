//! The session object: credential pair, its store, and the in-flight
//! renewal slot. Owned by one `SessionManager`; nothing else touches it.

use std::sync::{Mutex, MutexGuard};

use futures_util::future::{BoxFuture, Shared};
use tracing::warn;

use crate::credentials::CredentialPair;
use crate::error::{RenewalError, StorageError};
use crate::store::TokenStore;

use super::lock;

/// Handle every waiter clones to observe the same renewal outcome.
pub(crate) type RenewalHandle = Shared<BoxFuture<'static, Result<String, RenewalError>>>;

/// Lock order: `renewal` before `credentials`.
pub(crate) struct SessionState {
    store: Box<dyn TokenStore>,
    credentials: Mutex<CredentialPair>,
    renewal: Mutex<Option<RenewalHandle>>,
}

impl SessionState {
    pub(crate) fn new(store: Box<dyn TokenStore>) -> Self {
        Self {
            store,
            credentials: Mutex::new(CredentialPair::empty()),
            renewal: Mutex::new(None),
        }
    }

    pub(crate) fn credentials(&self) -> MutexGuard<'_, CredentialPair> {
        lock(&self.credentials)
    }

    pub(crate) fn renewal_slot(&self) -> MutexGuard<'_, Option<RenewalHandle>> {
        lock(&self.renewal)
    }

    /// Replace the in-memory pair with whatever the store holds.
    pub(crate) fn load(&self) -> Result<(), StorageError> {
        let stored = self.store.load()?;
        *self.credentials() = stored;
        Ok(())
    }

    /// Persist a new pair, then adopt it. Nothing changes if the store
    /// refuses the write.
    pub(crate) fn install(&self, pair: CredentialPair) -> Result<(), StorageError> {
        let mut credentials = self.credentials();
        self.store.persist(&pair)?;
        *credentials = pair;
        Ok(())
    }

    /// Adopt a pair while the caller already holds the credential lock.
    /// A failed write is logged; memory stays authoritative.
    pub(crate) fn install_locked(&self, credentials: &mut CredentialPair, pair: CredentialPair) {
        if let Err(e) = self.store.persist(&pair) {
            warn!("failed to persist renewed credentials: {e}");
        }
        *credentials = pair;
    }

    /// Drop the pair from memory and storage. Returns whether anything was
    /// held.
    pub(crate) fn clear(&self) -> bool {
        let mut credentials = self.credentials();
        self.clear_locked(&mut credentials)
    }

    pub(crate) fn clear_locked(&self, credentials: &mut CredentialPair) -> bool {
        let had_credentials = !credentials.is_empty();
        *credentials = CredentialPair::empty();
        if let Err(e) = self.store.clear() {
            warn!("failed to clear stored credentials: {e}");
        }
        had_credentials
    }

    /// Forget the in-memory pair without touching storage.
    ///
    /// An in-flight renewal keeps its slot. A session re-initialized from
    /// the same store joins it instead of spending the refresh token again.
    pub(crate) fn forget(&self) {
        *self.credentials() = CredentialPair::empty();
    }
}
