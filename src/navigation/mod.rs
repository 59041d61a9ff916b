//! Navigation subsystem.
//!
//! # Data Flow
//! ```text
//! push / push_named / back / forward
//!     → routing::RouteTable::resolve (matched chain, redirects followed)
//!     → loader::ComponentLoader (lazy units along the chain, concurrently)
//!     → sequence check (newer navigation? discard)
//!     → render.rs (ViewRenderer::mount) + history entry
//! ```

pub mod navigator;
pub mod render;

pub use navigator::{ActiveView, Activation, NavigationError, NavigationOutcome, Navigator};
pub use render::{TracingRenderer, ViewRenderer};
