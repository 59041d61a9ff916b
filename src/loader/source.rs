//! Component sources: where lazily bound view units come from.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::routing::ViewUnit;

/// Failure to produce a view unit.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("component chunk `{0}` is not available")]
    Missing(String),

    #[error("request for `{url}` failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("`{url}` returned status {status}")]
    Status { url: String, status: u16 },

    #[error("loading `{0}` timed out")]
    Timeout(String),

    #[error("invalid asset url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl LoadError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            LoadError::Transport { .. } | LoadError::Timeout(_) => true,
            LoadError::Status { status, .. } => *status >= 500,
            LoadError::Missing(_) | LoadError::InvalidUrl(_) | LoadError::Client(_) => false,
        }
    }
}

/// Produces view units on demand.
#[async_trait]
pub trait ComponentSource: Send + Sync {
    /// Fetch the unit for component `name`, packaged as `chunk`.
    async fn fetch(&self, name: &str, chunk: &str) -> Result<ViewUnit, LoadError>;
}

/// View units compiled into the binary, keyed by chunk.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedSource {
    units: HashMap<String, ViewUnit>,
}

impl EmbeddedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit under its chunk name.
    pub fn with_unit(mut self, unit: ViewUnit) -> Self {
        self.units.insert(unit.chunk.clone(), unit);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[async_trait]
impl ComponentSource for EmbeddedSource {
    async fn fetch(&self, _name: &str, chunk: &str) -> Result<ViewUnit, LoadError> {
        self.units
            .get(chunk)
            .cloned()
            .ok_or_else(|| LoadError::Missing(chunk.to_string()))
    }
}

/// Fetches `{base}{chunk}.js` from an asset server.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(LoadError::Client)?;
        Ok(Self { client, base })
    }

    /// URL a chunk is fetched from.
    pub fn chunk_url(&self, chunk: &str) -> Result<Url, LoadError> {
        Ok(self.base.join(&format!("{}.js", chunk))?)
    }
}

#[async_trait]
impl ComponentSource for HttpSource {
    async fn fetch(&self, name: &str, chunk: &str) -> Result<ViewUnit, LoadError> {
        let url = self.chunk_url(chunk)?;
        let url_str = url.to_string();
        tracing::debug!(component = name, url = %url_str, "Fetching component chunk");

        let transport = |source: reqwest::Error| {
            if source.is_timeout() {
                LoadError::Timeout(url_str.clone())
            } else {
                LoadError::Transport {
                    url: url_str.clone(),
                    source,
                }
            }
        };

        let response = self.client.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url_str.clone(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(transport)?;

        Ok(ViewUnit {
            name: name.to_string(),
            chunk: chunk.to_string(),
            origin: url_str,
            size: body.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_embedded_source() {
        let source = EmbeddedSource::new().with_unit(ViewUnit::embedded("Drone", "Drone"));
        assert_eq!(source.len(), 1);

        let unit = source.fetch("Drone", "Drone").await.unwrap();
        assert_eq!(unit.origin, "embedded");

        let err = source.fetch("Depth", "Depth").await.unwrap_err();
        assert!(matches!(err, LoadError::Missing(ref c) if c == "Depth"));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_chunk_url_keeps_base_directory() {
        let source = HttpSource::new("http://cdn.local/app/assets", Duration::from_secs(1)).unwrap();
        assert_eq!(
            source.chunk_url("PointCloud").unwrap().as_str(),
            "http://cdn.local/app/assets/PointCloud.js"
        );
    }

    #[test]
    fn test_status_classification() {
        let server_error = LoadError::Status { url: "u".into(), status: 503 };
        let not_found = LoadError::Status { url: "u".into(), status: 404 };
        assert!(server_error.is_transient());
        assert!(!not_found.is_transient());
        assert!(LoadError::Timeout("u".into()).is_transient());
    }
}
