//! The drone viewer route table.
//!
//! ```text
//! /                      home        Home (eager)
//! ├── drone              drone       Drone
//! ├── views              views       (no component)
//! │   ├── origin         origin      Origin
//! │   ├── depth          depth       Depth
//! │   ├── pointcloud     pointcloud  PointCloud
//! │   └── dem            dem         DEM
//! └── dashboard          dashboard   Dashboard
//! /:pathMatch(.*)*       (unnamed)   redirect → /
//! ```

use std::sync::Arc;

use crate::config::HistoryConfig;
use crate::loader::EmbeddedSource;
use crate::routing::{ComponentRef, RouteDef, RouteTable, TableError, ViewUnit, WebHistory};

pub const HOME: &str = "home";
pub const DRONE: &str = "drone";
pub const VIEWS: &str = "views";
pub const ORIGIN: &str = "origin";
pub const DEPTH: &str = "depth";
pub const POINTCLOUD: &str = "pointcloud";
pub const DEM: &str = "dem";
pub const DASHBOARD: &str = "dashboard";

/// Pattern of the fallback route.
pub const CATCH_ALL: &str = "/:pathMatch(.*)*";

/// Lazily bound components as `(component, chunk)`.
const LAZY_VIEWS: [(&str, &str); 6] = [
    ("Drone", "Drone"),
    ("Origin", "Origin"),
    ("Depth", "Depth"),
    ("PointCloud", "PointCloud"),
    ("DEM", "DEM"),
    ("Dashboard", "Dashboard"),
];

/// Route table plus its history strategy.
#[derive(Debug)]
pub struct AppRouter {
    pub table: Arc<RouteTable>,
    pub history: WebHistory,
}

/// The home shell, bound eagerly.
pub fn home_view() -> ViewUnit {
    ViewUnit::embedded("Home", "HomeView")
}

fn lazy(component: &str) -> ComponentRef {
    ComponentRef::lazy(component, component)
}

/// Route definitions in declaration order.
pub fn routes() -> Vec<RouteDef> {
    vec![
        RouteDef::new("/")
            .name(HOME)
            .component(ComponentRef::eager(home_view()))
            .children(vec![
                RouteDef::new("drone").name(DRONE).component(lazy("Drone")),
                RouteDef::new("views").name(VIEWS).children(vec![
                    RouteDef::new("origin").name(ORIGIN).component(lazy("Origin")),
                    RouteDef::new("depth").name(DEPTH).component(lazy("Depth")),
                    RouteDef::new("pointcloud")
                        .name(POINTCLOUD)
                        .component(lazy("PointCloud")),
                    RouteDef::new("dem").name(DEM).component(lazy("DEM")),
                ]),
                RouteDef::new("dashboard")
                    .name(DASHBOARD)
                    .component(lazy("Dashboard")),
            ]),
        RouteDef::redirect(CATCH_ALL, "/"),
    ]
}

/// Build the table and a history rooted at the configured base path.
pub fn build(history: &HistoryConfig) -> Result<AppRouter, TableError> {
    let table = RouteTable::new(routes())?;
    let history = WebHistory::new(&history.base_path);
    tracing::info!(
        routes = table.records().len(),
        base = %history.base(),
        "Drone viewer routes built"
    );
    Ok(AppRouter {
        table: Arc::new(table),
        history,
    })
}

/// In-process units for every lazily bound view.
pub fn embedded_source() -> EmbeddedSource {
    LAZY_VIEWS
        .iter()
        .fold(EmbeddedSource::new(), |source, (name, chunk)| {
            source.with_unit(ViewUnit::embedded(*name, *chunk))
        })
}
