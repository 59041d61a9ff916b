//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the route table and history from configuration
//! - Pick the component source and wrap it in the memoizing loader
//! - Assemble the navigator
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{RouterConfig, SourceKind};
use crate::loader::{ComponentLoader, ComponentSource, HttpSource, LoadError};
use crate::navigation::{Navigator, ViewRenderer};
use crate::routing::TableError;
use crate::views;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("route table: {0}")]
    Table(#[from] TableError),

    #[error("component source: {0}")]
    Source(#[from] LoadError),
}

/// Component source selected by configuration.
pub fn component_source(config: &RouterConfig) -> Result<Arc<dyn ComponentSource>, StartupError> {
    let source: Arc<dyn ComponentSource> = match config.components.source {
        SourceKind::Embedded => Arc::new(views::embedded_source()),
        SourceKind::Http => Arc::new(HttpSource::new(
            &config.components.asset_base_url,
            Duration::from_secs(config.components.load_timeout_secs),
        )?),
    };
    Ok(source)
}

/// Assemble the drone viewer navigator.
pub fn build_navigator(
    config: &RouterConfig,
    source: Arc<dyn ComponentSource>,
    renderer: Arc<dyn ViewRenderer>,
) -> Result<Navigator, StartupError> {
    let app = views::build(&config.history)?;
    let loader = ComponentLoader::new(source, config.retries.clone());
    Ok(Navigator::new(app.table, app.history, loader, renderer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::TracingRenderer;

    #[test]
    fn test_http_source_requires_valid_url() {
        let mut config = RouterConfig::default();
        config.components.source = SourceKind::Http;
        config.components.asset_base_url = "::nope".into();
        assert!(matches!(
            component_source(&config),
            Err(StartupError::Source(LoadError::InvalidUrl(_)))
        ));
    }

    #[tokio::test]
    async fn test_navigator_starts_at_home() {
        let config = RouterConfig::default();
        let source = component_source(&config).unwrap();
        let navigator = build_navigator(&config, source, Arc::new(TracingRenderer)).unwrap();

        let outcome = navigator.push("/").await.unwrap();
        let activation = outcome.activation().unwrap();
        assert_eq!(activation.resolution.names(), vec!["home"]);
    }
}
