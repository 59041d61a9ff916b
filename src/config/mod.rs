//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → consumed once at startup by the subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the route table never changes at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    default_config, load_config, load_config_with, parse_config, parse_config_with, ConfigError,
};
pub use schema::{
    ComponentConfig, HistoryConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
    RouterConfig, SourceKind,
};
