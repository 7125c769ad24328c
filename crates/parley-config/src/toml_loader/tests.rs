//! Tests for TOML config loading, creation, and path resolution.

use super::*;
use std::path::Path;

#[test]
fn load_from_nonexistent_returns_file_not_found() {
    let result = load_from_path(Path::new("/tmp/nonexistent_parley_config.toml"));
    let err = result.unwrap_err();
    assert!(matches!(err, parley_common::ConfigError::FileNotFound(_)));
}

#[test]
fn load_valid_partial_toml() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "https://chat.example.com/api/"
renewal_timeout_secs = 5
"#,
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "https://chat.example.com/api/");
    assert_eq!(config.api.renewal_timeout_secs, 5);
    // Defaults preserved
    assert_eq!(config.api.request_timeout_secs, 120);
    assert!(config.storage.credentials_path.is_none());
}

#[test]
fn load_invalid_toml_returns_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "this is not valid toml {{{").unwrap();

    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, parley_common::ConfigError::ParseError(_)));
}

#[test]
fn load_config_with_invalid_values_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[api]\nbase_url = \"ftp://nope\"\n").unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000/api/");
}

#[test]
fn create_and_load_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parley").join("config.toml");

    create_default_config(&path).unwrap();
    assert!(path.exists());

    let config = load_from_path(&path).unwrap();
    assert_eq!(config.api.base_url, "http://localhost:8000/api/");
    assert_eq!(config.logging.level, crate::LogLevel::Info);
}

#[test]
fn explicit_credentials_path_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[storage]\ncredentials_path = \"/var/lib/parley/creds.json\"\n\n[logging]\nlevel = \"debug\"\n",
    )
    .unwrap();

    let config = load_from_path(&path).unwrap();
    assert_eq!(
        config.storage.resolve_credentials_path().unwrap(),
        Path::new("/var/lib/parley/creds.json")
    );
    assert_eq!(config.logging.level, crate::LogLevel::Debug);
}
