//! Bounded retry with fixed backoff.
//!
//! Used by outbound calls that want at-least-once semantics, currently the
//! webhook notifier. Probes deliberately do not retry.

use std::future::Future;

use tokio::time::{Duration, sleep};

use crate::error::Result;

/// Fixed delay between webhook delivery attempts.
pub const WEBHOOK_BACKOFF: Duration = Duration::from_secs(2);

/// Run `op` up to `attempts` times, sleeping `backoff` between failures.
///
/// Returns the first success, or the last error once attempts are exhausted.
/// `attempts` is clamped to at least 1.
///
/// # Errors
///
/// Returns the final attempt's error when every attempt fails.
pub async fn retry_with_backoff<T, F, Fut>(
    attempts: u32,
    backoff: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = attempts.max(1);
    let mut last_err = None;

    for attempt in 1..=attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                tracing::debug!(attempt, attempts, error = %e, "attempt failed");
                last_err = Some(e);
                if attempt < attempts {
                    sleep(backoff).await;
                }
            }
        }
    }

    // attempts >= 1 guarantees at least one op() ran
    Err(last_err.expect("at least one attempt"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChanwatchError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, Duration::from_secs(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(3, Duration::from_secs(2), || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ChanwatchError::Network("flaky".to_string()))
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempts_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(4, Duration::from_secs(2), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ChanwatchError::Network("down".to_string())) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_attempts_still_runs_once() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(0, Duration::ZERO, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
