//! Conversation controller for the Parley chat backend.
//!
//! [`ConversationController`] keeps the ordered list of exchanges, inserts
//! each submitted message optimistically, and reconciles it with the
//! server's reply (or removes it) once the request resolves. Every call
//! goes through [`parley_session::SessionManager::execute`], so token
//! renewal is invisible here.
//!
//! [`ProviderSettings`] manages the user's third-party API key and model
//! choice.

mod controller;
mod conversation;
mod error;
mod exchange;
mod settings;

pub use controller::ConversationController;
pub use error::ChatError;
pub use exchange::{Exchange, ExchangeId, ExchangeRecord, ExchangeStatus};
pub use settings::{KeyStatus, ModelCatalog, ModelInfo, ProviderSettings, DEFAULT_MODEL};

use parley_session::{ApiResponse, SessionError};
use serde::de::DeserializeOwned;

/// Turn a non-success status into `Rejected`, then decode the body.
pub(crate) fn decode<T: DeserializeOwned>(response: ApiResponse) -> Result<T, SessionError> {
    Ok(response.error_for_status()?.json()?)
}

/// Backend endpoint paths, relative to the configured base URL.
pub mod endpoints {
    pub const CHAT: &str = "chat/";
    pub const CLEAR: &str = "chat/clear/";
    pub const API_KEY: &str = "user-api-key/";
    pub const MODELS: &str = "available-models/";
    pub const SELECT_MODEL: &str = "select-model/";
}
