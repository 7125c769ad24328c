use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Backend location and request deadlines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: String,
    /// TCP connect timeout in seconds (valid range: 1-600).
    pub connect_timeout_secs: u32,
    /// Whole-request timeout in seconds (valid range: 1-600).
    pub request_timeout_secs: u32,
    /// Deadline for a token renewal call in seconds (valid range: 1-60).
    pub renewal_timeout_secs: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".into(),
            connect_timeout_secs: 10,
            request_timeout_secs: 120,
            renewal_timeout_secs: 10,
        }
    }
}

impl ApiConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.connect_timeout_secs))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.request_timeout_secs))
    }

    pub fn renewal_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.renewal_timeout_secs))
    }
}
