//! Memoized lazy loading of view units.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::config::RetryConfig;
use crate::loader::source::{ComponentSource, LoadError};
use crate::observability::metrics;
use crate::resilience::retry_transient;
use crate::routing::{ComponentRef, NodeId, ViewUnit};

type Slot = Arc<OnceCell<Arc<ViewUnit>>>;

/// One-shot loader keyed by route node.
///
/// Concurrent loads of the same node share a single fetch. A successful
/// result is kept for the life of the loader; a failure leaves the slot
/// empty so a later navigation fetches again.
pub struct ComponentLoader {
    source: Arc<dyn ComponentSource>,
    slots: DashMap<NodeId, Slot>,
    retries: RetryConfig,
}

impl ComponentLoader {
    pub fn new(source: Arc<dyn ComponentSource>, retries: RetryConfig) -> Self {
        Self {
            source,
            slots: DashMap::new(),
            retries,
        }
    }

    /// Produce the unit bound to `node`, fetching it on first demand.
    pub async fn load(&self, node: NodeId, component: &ComponentRef) -> Result<Arc<ViewUnit>, LoadError> {
        let (name, chunk) = match component {
            ComponentRef::Eager { unit } => return Ok(Arc::clone(unit)),
            ComponentRef::Lazy { name, chunk } => (name.as_str(), chunk.as_str()),
        };

        let slot = Arc::clone(self.slots.entry(node).or_default().value());
        let unit = slot.get_or_try_init(|| self.fetch(name, chunk)).await?;
        Ok(Arc::clone(unit))
    }

    /// Whether `node` already has a cached unit.
    pub fn is_loaded(&self, node: NodeId) -> bool {
        self.slots
            .get(&node)
            .is_some_and(|slot| slot.initialized())
    }

    /// Number of cached units.
    pub fn loaded_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.value().initialized()).count()
    }

    async fn fetch(&self, name: &str, chunk: &str) -> Result<Arc<ViewUnit>, LoadError> {
        let started = Instant::now();
        let result = retry_transient(&self.retries, name, LoadError::is_transient, || {
            self.source.fetch(name, chunk)
        })
        .await;

        match &result {
            Ok(unit) => {
                metrics::record_component_load(name, "ok", started);
                tracing::info!(component = name, origin = %unit.origin, size = unit.size, "Component loaded");
            }
            Err(e) => {
                metrics::record_component_load(name, "error", started);
                tracing::error!(component = name, error = %e, "Component load failed");
            }
        }
        result.map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::source::EmbeddedSource;

    fn loader() -> ComponentLoader {
        let source = EmbeddedSource::new().with_unit(ViewUnit::embedded("Drone", "Drone"));
        ComponentLoader::new(Arc::new(source), RetryConfig::default())
    }

    #[tokio::test]
    async fn test_eager_component_is_returned_directly() {
        let loader = loader();
        let unit = ViewUnit::embedded("Home", "HomeView");
        let component = ComponentRef::eager(unit.clone());

        let loaded = loader.load(NodeId(0), &component).await.unwrap();
        assert_eq!(*loaded, unit);
        assert_eq!(loader.loaded_count(), 0);
    }

    #[tokio::test]
    async fn test_lazy_component_is_cached() {
        let loader = loader();
        let component = ComponentRef::lazy("Drone", "Drone");

        assert!(!loader.is_loaded(NodeId(1)));
        let first = loader.load(NodeId(1), &component).await.unwrap();
        let second = loader.load(NodeId(1), &component).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(loader.is_loaded(NodeId(1)));
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let loader = loader();
        let component = ComponentRef::lazy("Depth", "Depth");

        assert!(loader.load(NodeId(4), &component).await.is_err());
        assert!(!loader.is_loaded(NodeId(4)));
        assert_eq!(loader.loaded_count(), 0);
    }
}
