//! Third-party provider key and model selection.

use parley_session::{ApiRequest, SessionManager};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::info;

use crate::endpoints;
use crate::error::ChatError;

/// Model the backend uses until the user picks another.
pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KeyStatus {
    #[serde(default)]
    pub has_key: bool,
    #[serde(default = "default_model")]
    pub selected_model: String,
    /// Masked key, e.g. `gsk_...abcd`.
    #[serde(default)]
    pub key_preview: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub context_window: u64,
    #[serde(default)]
    pub owned_by: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelCatalog {
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub selected_model: Option<String>,
}

#[derive(Deserialize)]
struct ModelSelected {
    selected_model: Option<String>,
}

/// Client for the user's provider settings. Every call goes through the
/// session's renewal pipeline.
#[derive(Clone)]
pub struct ProviderSettings {
    session: SessionManager,
}

impl ProviderSettings {
    pub fn new(session: SessionManager) -> Self {
        Self { session }
    }

    pub async fn key_status(&self) -> Result<KeyStatus, ChatError> {
        let response = self
            .session
            .execute(ApiRequest::get(endpoints::API_KEY))
            .await?;
        Ok(crate::decode(response)?)
    }

    /// Save or replace the key. Without `model` the server keeps the
    /// current selection (or its default for a first key).
    pub async fn save_key(&self, api_key: &str, model: Option<&str>) -> Result<KeyStatus, ChatError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ChatError::Validation("API key must not be blank".into()));
        }

        let mut body = Map::new();
        body.insert("api_key".into(), Value::from(api_key));
        if let Some(model) = model {
            let model = non_blank_model(model)?;
            body.insert("selected_model".into(), Value::from(model));
        }

        let response = self
            .session
            .execute(ApiRequest::post(endpoints::API_KEY, Value::Object(body)))
            .await?;
        let status: KeyStatus = crate::decode(response)?;
        info!(model = %status.selected_model, "provider key saved");
        Ok(status)
    }

    pub async fn delete_key(&self) -> Result<(), ChatError> {
        let response = self
            .session
            .execute(ApiRequest::delete(endpoints::API_KEY))
            .await?;
        response.error_for_status()?;
        info!("provider key removed");
        Ok(())
    }

    pub async fn available_models(&self) -> Result<ModelCatalog, ChatError> {
        let response = self
            .session
            .execute(ApiRequest::get(endpoints::MODELS))
            .await?;
        Ok(crate::decode(response)?)
    }

    /// Switch model without touching the key. Returns the model the server
    /// now has selected.
    pub async fn select_model(&self, model: &str) -> Result<String, ChatError> {
        let model = non_blank_model(model)?;
        let response = self
            .session
            .execute(ApiRequest::post(
                endpoints::SELECT_MODEL,
                json!({ "selected_model": model }),
            ))
            .await?;
        let selected: ModelSelected = crate::decode(response)?;
        let selected = selected.selected_model.unwrap_or_else(|| model.to_string());
        info!(model = %selected, "model selected");
        Ok(selected)
    }
}

fn non_blank_model(model: &str) -> Result<&str, ChatError> {
    let model = model.trim();
    if model.is_empty() {
        return Err(ChatError::Validation("model must not be blank".into()));
    }
    Ok(model)
}
