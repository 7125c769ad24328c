//! Credential session manager for the Parley chat backend.
//!
//! Owns the access/refresh token pair, persists it between runs, attaches
//! the access token to every outbound request, and renews it exactly once
//! (shared by all concurrent callers) when the backend reports it invalid.
//!
//! - [`SessionManager`] is the entry point; [`SessionManager::execute`]
//!   is the authenticated request pipeline.
//! - [`Transport`] is the seam to the network; [`HttpTransport`] is the
//!   reqwest implementation.
//! - [`TokenStore`] is the seam to local persistence.

mod credentials;
mod error;
mod manager;
mod request;
mod store;
mod transport;

#[cfg(any(test, feature = "test-support"))]
pub mod mock;

pub use credentials::CredentialPair;
pub use error::{RenewalError, ServerErrors, SessionError, StorageError, TransportError};
pub use manager::{AccountRecord, RegisterOutcome, Registration, SessionConfig, SessionManager};
pub use request::{ApiRequest, ApiResponse, Method};
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use transport::{HttpTransport, Transport};

/// Backend endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const LOGIN: &str = "token/";
    pub const RENEW: &str = "token/refresh/";
    pub const REGISTER: &str = "register/";
}
