//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use view_router::config::{RetryConfig, RouterConfig};
use view_router::lifecycle::{build_navigator, Shutdown};
use view_router::loader::{ComponentSource, EmbeddedSource, LoadError};
use view_router::navigation::{Activation, Navigator, ViewRenderer};
use view_router::routing::ViewUnit;
use view_router::{views, HttpServer};

/// Renderer that remembers the component names of every mount.
#[derive(Default)]
pub struct RecordingRenderer {
    mounts: Mutex<Vec<Vec<String>>>,
}

impl RecordingRenderer {
    pub fn mounts(&self) -> Vec<Vec<String>> {
        self.mounts.lock().unwrap().clone()
    }
}

impl ViewRenderer for RecordingRenderer {
    fn mount(&self, activation: &Activation) {
        let names = activation.views.iter().map(|v| v.unit.name.clone()).collect();
        self.mounts.lock().unwrap().push(names);
    }
}

/// Embedded source that counts fetches and can be slowed down or made to fail.
#[derive(Default)]
pub struct ScriptedSource {
    inner: EmbeddedSource,
    fetches: Mutex<HashMap<String, usize>>,
    delays: HashMap<String, Duration>,
    failures: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            inner: views::embedded_source(),
            ..Self::default()
        }
    }

    /// Delay every fetch of `chunk`.
    pub fn delay(mut self, chunk: &str, delay: Duration) -> Self {
        self.delays.insert(chunk.to_string(), delay);
        self
    }

    /// Fail the next `times` fetches of `chunk` with a timeout.
    pub fn fail(self, chunk: &str, times: usize) -> Self {
        self.failures.lock().unwrap().insert(chunk.to_string(), times);
        self
    }

    pub fn fetches(&self, chunk: &str) -> usize {
        self.fetches.lock().unwrap().get(chunk).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ComponentSource for ScriptedSource {
    async fn fetch(&self, name: &str, chunk: &str) -> Result<ViewUnit, LoadError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.fetches.lock().unwrap().entry(chunk.to_string()).or_default() += 1;

        if let Some(delay) = self.delays.get(chunk) {
            tokio::time::sleep(*delay).await;
        }

        let should_fail = {
            let mut failures = self.failures.lock().unwrap();
            match failures.get_mut(chunk) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_fail {
            return Err(LoadError::Timeout(chunk.to_string()));
        }

        self.inner.fetch(name, chunk).await
    }
}

/// Retry policy with millisecond delays.
pub fn fast_retries(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        enabled: true,
        max_attempts,
        base_delay_ms: 1,
        max_delay_ms: 5,
    }
}

/// Navigator over the drone viewer table with the given source.
pub fn navigator(
    config: &RouterConfig,
    source: Arc<ScriptedSource>,
    renderer: Arc<RecordingRenderer>,
) -> Arc<Navigator> {
    Arc::new(build_navigator(config, source, renderer).unwrap())
}

/// Start the control server on an ephemeral port.
pub async fn start_server(navigator: Arc<Navigator>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&RouterConfig::default().listener, navigator);
    let rx = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}
