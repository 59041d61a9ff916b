//! Lazy component loading.
//!
//! # Data Flow
//! ```text
//! Navigator needs the unit for a matched route
//!     → cache.rs (per-node once-cell; hit returns the cached unit)
//!     → on miss: resilience::retries (bounded retry of transient failures)
//!     → source.rs (embedded registry or HTTP asset fetch)
//! ```
//!
//! # Design Decisions
//! - Keyed by NodeId, independent of how units are packaged
//! - At most one successful fetch per node per process
//! - Failures are never cached

pub mod cache;
pub mod source;

pub use cache::ComponentLoader;
pub use source::{ComponentSource, EmbeddedSource, HttpSource, LoadError};
