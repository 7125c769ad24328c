mod app;
mod cli;
mod commands;
mod error;
mod prompt;
mod render;

use std::path::Path;
use std::process::ExitCode;

use parley_common::ConfigError;
use parley_config::{LogLevel, ParleyConfig};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::cli::Args;
use crate::error::CliError;

/// KEY=VALUE pairs from `.env` contents. Blank lines and `#` comments are
/// skipped; surrounding quotes are stripped from values.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

/// Load `.env` from the working directory. Variables already set win.
///
/// Must run before any other thread exists: `set_var` is not safe to call
/// while another thread may read the environment.
fn load_dotenv() {
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return;
    };
    for (key, value) in parse_dotenv(&contents) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(key, value);
        }
    }
}

/// `--log-level` wins, then `RUST_LOG`, then the configured level. A bare
/// level is scoped to the parley crates.
fn init_logging(cli_level: Option<&str>, config_level: LogLevel) {
    let filter = match cli_level {
        Some(level) if level.contains('=') => EnvFilter::try_new(level).map_err(drop),
        Some(level) => EnvFilter::try_new(format!("parley={level}")).map_err(drop),
        None => EnvFilter::try_from_default_env().map_err(drop),
    }
    .unwrap_or_else(|_| EnvFilter::new(config_level.directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<ParleyConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => parley_config::load_config_from(Path::new(path))?,
        None => parley_config::load_config()?,
    };
    if let Some(url) = &args.api_url {
        config.api.base_url = url.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    load_dotenv();
    let args = cli::parse();

    let config = load_config(&args);
    let level = config
        .as_ref()
        .map(|c| c.logging.level)
        .unwrap_or_default();
    init_logging(args.log_level.as_deref(), level);
    tracing::debug!("parley v{} starting", env!("CARGO_PKG_VERSION"));

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(args, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if e.needs_login() {
                eprintln!("Run `parley login <username>` to sign in.");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, config: Result<ParleyConfig, ConfigError>) -> Result<(), CliError> {
    let config = config?;
    if let Some(path) = &args.config {
        tracing::info!("using config override: {path}");
    }

    let app = App::build(&config, args.ephemeral)?;
    let watcher = app.watch_session();

    let result = commands::run(&app, &config, args.command).await;

    app.session.teardown();
    watcher.abort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotenv_skips_comments_and_strips_quotes() {
        let pairs = parse_dotenv(
            "# backend\nPARLEY_API_URL=\"http://example.test/api/\"\n\n  RUST_LOG = debug \nNAME='parley'\n",
        );
        assert_eq!(
            pairs,
            vec![
                ("PARLEY_API_URL".to_string(), "http://example.test/api/".to_string()),
                ("RUST_LOG".to_string(), "debug".to_string()),
                ("NAME".to_string(), "parley".to_string()),
            ]
        );
    }

    #[test]
    fn dotenv_ignores_lines_without_a_key() {
        let pairs = parse_dotenv("not a pair\n=orphan\nEMPTY=\n");
        assert_eq!(pairs, vec![("EMPTY".to_string(), String::new())]);
    }
}
