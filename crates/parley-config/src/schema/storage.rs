use std::path::PathBuf;

use parley_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Where the credential pair is persisted between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Explicit credentials file. Defaults to `credentials.json` in the
    /// platform data directory.
    pub credentials_path: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_credentials_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.credentials_path {
            Some(path) => Ok(path.clone()),
            None => crate::paths::credentials_file(),
        }
    }
}
