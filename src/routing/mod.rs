//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Requested location (path, query, fragment)
//!     → history.rs (strip deployment base path)
//!     → router.rs (normalize, look up, follow redirects)
//!     → matcher.rs (evaluate segment patterns per level)
//!     → Return: Resolution (matched chain root → leaf)
//!
//! Route Compilation (at startup):
//!     RouteDef[]
//!     → Parse patterns, assign pre-order NodeIds
//!     → Check invariants (one root, unique names, catch-all last)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in the matching path (segment comparison only)
//! - Deterministic: same input always resolves to the same chain
//! - First match wins (declaration order)

pub mod history;
pub mod matcher;
pub mod node;
pub mod router;

pub use history::WebHistory;
pub use matcher::{ParamValue, Params, PathPattern};
pub use node::{ComponentRef, NodeId, RouteDef, RouteNode, ViewUnit};
pub use router::{RedirectedFrom, Resolution, ResolveError, RouteRecord, RouteTable, TableError};
