//! Configuration schema types for Parley.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod api;
mod logging;
mod storage;

pub use api::*;
pub use logging::*;
pub use storage::*;

use serde::{Deserialize, Serialize};

/// Root configuration for the chat client.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ParleyConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}
