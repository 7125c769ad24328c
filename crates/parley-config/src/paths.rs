use std::path::PathBuf;

use parley_common::ConfigError;

pub(crate) const APP_NAME: &str = "parley";

/// Returns the platform-specific configuration directory for Parley.
///
/// - macOS: `~/Library/Application Support/parley`
/// - Linux: `$XDG_CONFIG_HOME/parley` (defaults to `~/.config/parley`)
/// - Windows: `%APPDATA%\parley`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?
        .join(APP_NAME))
}

/// Returns the platform-specific data directory for Parley.
///
/// - Linux: `$XDG_DATA_HOME/parley` (defaults to `~/.local/share/parley`)
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::data_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine data directory".into()))?
        .join(APP_NAME))
}

/// Returns the path to the main configuration file.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Returns the default path of the persisted credential pair.
pub fn credentials_file() -> Result<PathBuf, ConfigError> {
    Ok(data_dir()?.join("credentials.json"))
}
