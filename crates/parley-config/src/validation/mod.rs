//! Full configuration validation.
//!
//! Each rule pushes a message into a shared list; all violations are
//! reported together in a single `ConfigError`.

mod helpers;


use crate::schema::ParleyConfig;
use helpers::validate_range;
use parley_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &ParleyConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_api(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_api(errors: &mut Vec<String>, config: &ParleyConfig) {
    let api = &config.api;
    let url = api.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "api.base_url = {:?} must start with http:// or https://",
            api.base_url
        ));
    }

    validate_range(errors, "api.connect_timeout_secs", api.connect_timeout_secs, 1, 600);
    validate_range(errors, "api.request_timeout_secs", api.request_timeout_secs, 1, 600);
    validate_range(errors, "api.renewal_timeout_secs", api.renewal_timeout_secs, 1, 60);
}
