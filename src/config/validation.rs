//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts > 0)
//! - Check addresses and URLs parse
//! - Keep the worst-case component load inside the request timeout
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{RetryConfig, RouterConfig, SourceKind};

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.history.base_path.starts_with('/') {
        errors.push(ValidationError::new(
            "history.base_path",
            format!("`{}` must start with `/`", config.history.base_path),
        ));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("`{}` is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }

    if config.components.load_timeout_secs == 0 {
        errors.push(ValidationError::new("components.load_timeout_secs", "must be > 0"));
    }
    if config.components.source == SourceKind::Http {
        match Url::parse(&config.components.asset_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(ValidationError::new(
                "components.asset_base_url",
                format!("unsupported scheme `{}`", url.scheme()),
            )),
            Err(e) => errors.push(ValidationError::new(
                "components.asset_base_url",
                e.to_string(),
            )),
        }
    }

    if config.components.source == SourceKind::Http && config.components.load_timeout_secs > 0 {
        let worst_ms = worst_case_load_ms(config.components.load_timeout_secs, &config.retries);
        let budget_ms = config.listener.request_timeout_secs.saturating_mul(1000);
        if worst_ms >= budget_ms {
            errors.push(ValidationError::new(
                "components.load_timeout_secs",
                format!(
                    "worst-case load of {}ms does not fit listener.request_timeout_secs ({}ms)",
                    worst_ms, budget_ms
                ),
            ));
        }
    }

    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::new("retries.max_attempts", "must be > 0"));
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        errors.push(ValidationError::new(
            "retries.base_delay_ms",
            "must not exceed retries.max_delay_ms",
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("`{}` is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Every attempt timing out, plus the largest jittered backoff before each retry.
fn worst_case_load_ms(load_timeout_secs: u64, retries: &RetryConfig) -> u64 {
    let attempts = if retries.enabled {
        u64::from(retries.max_attempts.max(1))
    } else {
        1
    };
    let backoff: u64 = (1..attempts)
        .map(|retry| {
            let factor = 2u64.saturating_pow(u32::try_from(retry - 1).unwrap_or(u32::MAX));
            let capped = retries
                .base_delay_ms
                .saturating_mul(factor)
                .min(retries.max_delay_ms);
            capped.saturating_add(capped / 10)
        })
        .fold(0, u64::saturating_add);
    load_timeout_secs
        .saturating_mul(1000)
        .saturating_mul(attempts)
        .saturating_add(backoff)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RouterConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = RouterConfig::default();
        config.history.base_path = "viewer".into();
        config.retries.max_attempts = 0;
        config.components.source = SourceKind::Http;
        config.components.asset_base_url = "ftp://assets".into();

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                "history.base_path",
                "components.asset_base_url",
                "retries.max_attempts"
            ]
        );
    }

    #[test]
    fn test_http_defaults_fit_request_timeout() {
        let mut config = RouterConfig::default();
        config.components.source = SourceKind::Http;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_retries_must_fit_request_timeout() {
        let mut config = RouterConfig::default();
        config.components.source = SourceKind::Http;
        config.components.load_timeout_secs = 10;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "components.load_timeout_secs");

        config.retries.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_worst_case_load_includes_backoff() {
        let retries = RetryConfig::default();
        // 3 x 5s, then 110ms and 220ms of backoff
        assert_eq!(worst_case_load_ms(5, &retries), 15_330);
    }

    #[test]
    fn test_asset_url_ignored_for_embedded_source() {
        let mut config = RouterConfig::default();
        config.components.asset_base_url = "not a url".into();
        assert!(validate_config(&config).is_ok());
    }
}
