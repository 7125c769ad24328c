//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Parley Configuration
# Only override what you want to change -- missing fields use defaults.

[api]
# base_url = "http://localhost:8000/api/"   # PARLEY_API_URL overrides this
# connect_timeout_secs = 10                 # 1-600
# request_timeout_secs = 120                # 1-600
# renewal_timeout_secs = 10                 # 1-60

[storage]
# Access and refresh tokens are stored unencrypted; anyone who can read
# this file can act as you until the refresh token expires.
# credentials_path = "/path/to/credentials.json"

[logging]
# level = "info"   # debug, info, warn, error
"##
    .to_string()
}
