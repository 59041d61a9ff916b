//! Bounded retry of transient failures.
//!
//! # Responsibilities
//! - Re-run an async operation while its error is transient
//! - Sleep with jittered exponential backoff between attempts
//! - Stop after `max_attempts` or on the first permanent error
//!
//! # Design Decisions
//! - The caller classifies errors; this module never inspects them
//! - Disabled retries mean exactly one attempt

use std::future::Future;

use crate::config::RetryConfig;
use crate::resilience::backoff::backoff_delay;

/// Run `op` until it succeeds, fails permanently, or attempts run out.
pub async fn retry_transient<T, E, F, Fut>(
    config: &RetryConfig,
    label: &str,
    is_transient: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = if config.enabled {
        config.max_attempts.max(1)
    } else {
        1
    };
    let mut attempt = 0;

    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && is_transient(&e) => {
                let delay = backoff_delay(attempt, config);
                tracing::info!(
                    target_name = label,
                    attempt,
                    delay = ?delay,
                    error = %e,
                    "Retrying after transient failure"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig {
            enabled: true,
            max_attempts,
            base_delay_ms: 1,
            max_delay_ms: 2,
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<u32, String> = retry_transient(&fast(3), "t", |_| true, move || async move {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 2 { Err("flaky".to_string()) } else { Ok(n) }
        })
        .await;
        assert_eq!(result, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result: Result<(), String> = retry_transient(&fast(5), "t", |_| false, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("gone".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_disabled_means_single_attempt() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let mut config = fast(5);
        config.enabled = false;
        let result: Result<(), String> = retry_transient(&config, "t", |_| true, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err("flaky".to_string())
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
