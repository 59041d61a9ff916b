//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Lazy component fetch:
//!     → retries.rs (classify failure, retry transient ones)
//!     → backoff.rs (jittered exponential delay between attempts)
//! ```
//!
//! # Design Decisions
//! - Retries are bounded; the final error reaches the navigator unchanged
//! - Only transient failures (transport, timeout, 5xx) are retried
//! - Jittered backoff prevents synchronized refetches

pub mod backoff;
pub mod retries;

pub use retries::retry_transient;
