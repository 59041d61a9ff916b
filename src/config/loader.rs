//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::RouterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variable overriding `history.base_path` at deploy time.
pub const BASE_URL_ENV: &str = "VIEW_ROUTER_BASE_URL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RouterConfig, ConfigError> {
    load_config_with(path, process_env)
}

/// Like [`load_config`], reading overrides through `lookup`.
pub fn load_config_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RouterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config_with(&content, lookup)?;
    tracing::debug!(path = %path.display(), "Configuration file read");
    Ok(config)
}

/// Parse, apply environment overrides and validate a TOML document.
pub fn parse_config(content: &str) -> Result<RouterConfig, ConfigError> {
    parse_config_with(content, process_env)
}

/// Like [`parse_config`], reading overrides through `lookup`.
pub fn parse_config_with(
    content: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<RouterConfig, ConfigError> {
    let mut config: RouterConfig = toml::from_str(content)?;
    apply_env_overrides(&mut config, lookup);
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Defaults plus environment overrides, validated.
pub fn default_config() -> Result<RouterConfig, ConfigError> {
    parse_config("")
}

/// Apply deploy-time overrides using `lookup` to read variables.
pub fn apply_env_overrides(config: &mut RouterConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(base) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
        config.history.base_path = base.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_env_override_base_path() {
        let mut config = RouterConfig::default();
        apply_env_overrides(&mut config, |key| {
            (key == BASE_URL_ENV).then(|| "/viewer/".to_string())
        });
        assert_eq!(config.history.base_path, "/viewer/");

        apply_env_overrides(&mut config, |_| Some("  ".to_string()));
        assert_eq!(config.history.base_path, "/viewer/");
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join("view_router_loader_test.toml");
        fs::write(&path, "[retries]\nmax_attempts = 5\n").unwrap();

        let config = load_config_with(&path, no_env).unwrap();
        assert_eq!(config.retries.max_attempts, 5);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let err = parse_config_with("[retries]\nmax_attempts = 0\n", no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref e) if e.len() == 1));
        assert!(err.to_string().contains("retries.max_attempts"));

        assert!(matches!(
            parse_config_with("[history\n", no_env),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_lookup_override_is_validated() {
        let config = parse_config_with("", |_| Some("/viewer/".to_string())).unwrap();
        assert_eq!(config.history.base_path, "/viewer/");

        let err = parse_config_with("", |_| Some("viewer".to_string())).unwrap_err();
        assert!(err.to_string().contains("history.base_path"));
    }
}
