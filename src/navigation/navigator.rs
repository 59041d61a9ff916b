//! Navigation: resolve, load, commit, render.
//!
//! # Responsibilities
//! - Resolve locations and named routes against the table
//! - Load every lazily bound unit on the matched chain
//! - Hand completed activations to the renderer and record history
//! - Discard navigations overtaken by a newer one
//!
//! # Design Decisions
//! - Each navigation draws a sequence number once its location resolves
//! - Last navigation wins: a stale one still fills the load cache, but is
//!   never rendered
//! - A failed load leaves the current activation untouched
//! - History changes only on commit, so a failed or superseded navigation
//!   (including back/forward) leaves the cursor where it was

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwapOption;
use futures_util::future::try_join_all;
use serde::Serialize;
use thiserror::Error;

use crate::loader::{ComponentLoader, LoadError};
use crate::navigation::render::ViewRenderer;
use crate::observability::metrics;
use crate::routing::{NodeId, Params, Resolution, ResolveError, RouteTable, ViewUnit, WebHistory};

/// Why a navigation did not complete.
#[derive(Debug, Error)]
pub enum NavigationError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to load `{component}` for `{path}`: {source}")]
    Load {
        path: String,
        component: String,
        #[source]
        source: LoadError,
    },
}

/// A view unit mounted for one matched route.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveView {
    pub route: NodeId,
    pub name: Option<String>,
    pub unit: Arc<ViewUnit>,
}

/// A completed navigation as handed to the renderer.
#[derive(Debug, Serialize)]
pub struct Activation {
    pub sequence: u64,
    /// Location including the deployment base path.
    pub href: String,
    pub resolution: Resolution,
    /// Units for every matched route that has a component, outermost first.
    pub views: Vec<ActiveView>,
}

#[derive(Debug, Clone)]
pub enum NavigationOutcome {
    Completed(Arc<Activation>),
    /// A newer navigation started before this one finished loading.
    Superseded { sequence: u64, latest: u64 },
}

impl NavigationOutcome {
    pub fn activation(&self) -> Option<&Arc<Activation>> {
        match self {
            NavigationOutcome::Completed(activation) => Some(activation),
            NavigationOutcome::Superseded { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryMode {
    Push,
    Replace,
    Back,
    Forward,
}

pub struct Navigator {
    table: Arc<RouteTable>,
    history: WebHistory,
    loader: ComponentLoader,
    renderer: Arc<dyn ViewRenderer>,
    sequence: AtomicU64,
    commit: Mutex<()>,
    current: ArcSwapOption<Activation>,
}

impl Navigator {
    pub fn new(
        table: Arc<RouteTable>,
        history: WebHistory,
        loader: ComponentLoader,
        renderer: Arc<dyn ViewRenderer>,
    ) -> Self {
        Self {
            table,
            history,
            loader,
            renderer,
            sequence: AtomicU64::new(0),
            commit: Mutex::new(()),
            current: ArcSwapOption::empty(),
        }
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }

    pub fn history(&self) -> &WebHistory {
        &self.history
    }

    pub fn loader(&self) -> &ComponentLoader {
        &self.loader
    }

    /// The activation currently displayed, if any.
    pub fn current(&self) -> Option<Arc<Activation>> {
        self.current.load_full()
    }

    /// Sequence number of the most recently started navigation.
    pub fn latest_sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Navigate to a location (with or without the base path) and record it.
    pub async fn push(&self, location: &str) -> Result<NavigationOutcome, NavigationError> {
        let path = self.history.strip_base(location).to_string();
        self.navigate(&path, HistoryMode::Push).await
    }

    /// Navigate to a location, overwriting the current history entry.
    pub async fn replace(&self, location: &str) -> Result<NavigationOutcome, NavigationError> {
        let path = self.history.strip_base(location).to_string();
        self.navigate(&path, HistoryMode::Replace).await
    }

    /// Navigate to a named route.
    pub async fn push_named(
        &self,
        name: &str,
        params: &Params,
    ) -> Result<NavigationOutcome, NavigationError> {
        let path = self.table.location_for(name, params)?;
        self.navigate(&path, HistoryMode::Push).await
    }

    /// Step back in history. `Ok(None)` when already at the oldest entry.
    pub async fn back(&self) -> Result<Option<NavigationOutcome>, NavigationError> {
        let Some(location) = self.history.peek_back() else {
            return Ok(None);
        };
        self.navigate(&location, HistoryMode::Back).await.map(Some)
    }

    /// Step forward in history. `Ok(None)` when already at the newest entry.
    pub async fn forward(&self) -> Result<Option<NavigationOutcome>, NavigationError> {
        let Some(location) = self.history.peek_forward() else {
            return Ok(None);
        };
        self.navigate(&location, HistoryMode::Forward).await.map(Some)
    }

    async fn navigate(
        &self,
        location: &str,
        mode: HistoryMode,
    ) -> Result<NavigationOutcome, NavigationError> {
        let resolution = match self.table.resolve(location) {
            Ok(resolution) => resolution,
            Err(e) => {
                metrics::record_navigation("failed");
                tracing::warn!(location, error = %e, "Navigation rejected");
                return Err(e.into());
            }
        };
        if let Some(from) = &resolution.redirected_from {
            metrics::record_fallback_redirect();
            tracing::warn!(from = %from.path, to = %resolution.path, "Unmatched location redirected");
        }

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(sequence, path = %resolution.path, "Navigation started");

        let views = match self.load_views(&resolution).await {
            Ok(views) => views,
            Err(e) => {
                metrics::record_navigation("failed");
                tracing::error!(sequence, error = %e, "Navigation aborted, keeping current view");
                return Err(e);
            }
        };

        let _commit = self.commit.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let latest = self.sequence.load(Ordering::SeqCst);
        if latest != sequence {
            metrics::record_navigation("superseded");
            tracing::warn!(sequence, latest, path = %resolution.path, "Navigation superseded");
            return Ok(NavigationOutcome::Superseded { sequence, latest });
        }

        let activation = Arc::new(Activation {
            sequence,
            href: self.history.href(&resolution.path),
            resolution,
            views,
        });
        self.renderer.mount(&activation);
        self.current.store(Some(Arc::clone(&activation)));

        match mode {
            HistoryMode::Push => self.history.push(&activation.resolution.path),
            HistoryMode::Replace => self.history.replace(&activation.resolution.path),
            HistoryMode::Back => {
                self.history.back();
            }
            HistoryMode::Forward => {
                self.history.forward();
            }
        }

        metrics::record_navigation("completed");
        tracing::info!(
            sequence,
            href = %activation.href,
            routes = ?activation.resolution.names(),
            "Navigation completed"
        );
        Ok(NavigationOutcome::Completed(activation))
    }

    async fn load_views(&self, resolution: &Resolution) -> Result<Vec<ActiveView>, NavigationError> {
        let loads = resolution.matched.iter().filter_map(|record| {
            let component = record.component.as_ref()?;
            Some(async move {
                self.loader
                    .load(record.id, component)
                    .await
                    .map(|unit| ActiveView {
                        route: record.id,
                        name: record.name.clone(),
                        unit,
                    })
                    .map_err(|source| NavigationError::Load {
                        path: resolution.path.clone(),
                        component: component.name().to_string(),
                        source,
                    })
            })
        });
        try_join_all(loads).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::loader::EmbeddedSource;
    use crate::navigation::render::TracingRenderer;
    use crate::routing::{ComponentRef, RouteDef};

    fn navigator(base: &str) -> Navigator {
        let table = RouteTable::new(vec![
            RouteDef::new("/")
                .name("home")
                .component(ComponentRef::eager(ViewUnit::embedded("Home", "HomeView")))
                .children(vec![RouteDef::new("drone")
                    .name("drone")
                    .component(ComponentRef::lazy("Drone", "Drone"))]),
            RouteDef::redirect("/:pathMatch(.*)*", "/"),
        ])
        .unwrap();
        let source = EmbeddedSource::new().with_unit(ViewUnit::embedded("Drone", "Drone"));
        let loader = ComponentLoader::new(Arc::new(source), RetryConfig::default());
        Navigator::new(
            Arc::new(table),
            WebHistory::new(base),
            loader,
            Arc::new(TracingRenderer),
        )
    }

    #[tokio::test]
    async fn test_push_strips_base_and_records_history() {
        let nav = navigator("/viewer/");
        let outcome = nav.push("/viewer/drone").await.unwrap();
        let activation = outcome.activation().unwrap();

        assert_eq!(activation.href, "/viewer/drone");
        assert_eq!(activation.sequence, 1);
        let names: Vec<_> = activation.views.iter().map(|v| v.unit.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Drone"]);
        assert_eq!(nav.history().location().as_deref(), Some("/drone"));
    }

    #[tokio::test]
    async fn test_back_and_forward() {
        let nav = navigator("/");
        nav.push("/").await.unwrap();
        nav.push("/drone").await.unwrap();

        let back = nav.back().await.unwrap().unwrap();
        assert_eq!(back.activation().unwrap().resolution.path, "/");
        assert!(nav.back().await.unwrap().is_none());

        nav.forward().await.unwrap().unwrap();
        assert_eq!(nav.current().unwrap().resolution.path, "/drone");
        assert_eq!(nav.history().len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_name_is_reported() {
        let nav = navigator("/");
        let err = nav.push_named("missing", &Params::new()).await.unwrap_err();
        assert!(matches!(err, NavigationError::Resolve(ResolveError::UnknownName(_))));
        assert!(nav.current().is_none());
        assert_eq!(nav.latest_sequence(), 0);
    }

    #[tokio::test]
    async fn test_replace_overwrites_entry() {
        let nav = navigator("/");
        nav.push("/").await.unwrap();
        nav.replace("/drone").await.unwrap();
        assert_eq!(nav.history().len(), 1);
        assert_eq!(nav.history().location().as_deref(), Some("/drone"));
    }
}
