//! Route table and navigation runtime for the drone viewer.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod loader;
pub mod navigation;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod views;

pub use config::RouterConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use navigation::Navigator;
pub use routing::RouteTable;
