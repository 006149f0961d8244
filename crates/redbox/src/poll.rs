// Retry/poll primitive used by the presence protocol
//
// Same loop shape as an auto-retrying assertion: run the predicate, check
// the deadline, sleep, repeat. The predicate always runs at least once, even
// with a zero timeout.

use std::future::Future;
use std::time::{Duration, Instant};

/// Polls `predicate` until it returns `true` or `timeout` elapses.
///
/// Returns `true` if the predicate succeeded within the budget, `false` on
/// timeout. Never hangs: the deadline is checked after every attempt.
pub async fn poll_until<F, Fut>(mut predicate: F, timeout: Duration, interval: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if predicate().await {
            tracing::trace!(attempts, elapsed = ?start.elapsed(), "poll predicate satisfied");
            return true;
        }

        if start.elapsed() >= timeout {
            tracing::debug!(attempts, ?timeout, "poll timed out");
            return false;
        }

        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn immediate_success_returns_true() {
        let ok = poll_until(
            || async { true },
            Duration::from_millis(50),
            Duration::from_millis(5),
        )
        .await;
        assert!(ok);
    }

    #[tokio::test]
    async fn success_after_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let ok = poll_until(
            move || async move { counter.fetch_add(1, Ordering::SeqCst) >= 2 },
            Duration::from_millis(500),
            Duration::from_millis(1),
        )
        .await;
        assert!(ok);
        assert!(calls.load(Ordering::SeqCst) >= 3);
    }

    #[tokio::test]
    async fn timeout_returns_false() {
        let ok = poll_until(
            || async { false },
            Duration::from_millis(20),
            Duration::from_millis(5),
        )
        .await;
        assert!(!ok);
    }

    #[tokio::test]
    async fn zero_timeout_still_runs_predicate_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let ok = poll_until(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                false
            },
            Duration::ZERO,
            Duration::from_millis(5),
        )
        .await;
        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
