//! Helpers for async tests that wait on the watcher's timing.
//!
//! Sweeps run on an interval, so tests observe effects with bounded
//! polling instead of fixed sleeps.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Assert that an async condition eventually holds within a timeout.
///
/// Retries `f` at `interval` until it returns `Ok` or `timeout`
/// elapses. The final panic message carries the last error so a flaky
/// run says what it was still waiting for.
///
/// # Example
///
/// ```rust,ignore
/// # use std::time::Duration;
/// # async fn example() {
/// use remindme::test_utils::assert_eventually;
///
/// // Wait up to 2 seconds for the sweep to deliver, checking every 25ms
/// assert_eventually(
///     "reminder to be delivered",
///     Duration::from_secs(2),
///     Duration::from_millis(25),
///     || async {
///         if recorder.delivered().is_empty() {
///             Err("nothing delivered yet")
///         } else {
///             Ok(())
///         }
///     },
/// )
/// .await;
/// # }
/// ```
pub async fn assert_eventually<F, Fut, T, E>(
    desc: &str,
    timeout: Duration,
    interval: Duration,
    mut f: F,
) -> T
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let start = std::time::Instant::now();
    let mut attempt = 0;

    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return value,
            Err(e) => {
                let elapsed = start.elapsed();
                if elapsed >= timeout {
                    panic!(
                        "Timeout waiting for {}\n\
                         Duration: {:?}\n\
                         Attempts: {}\n\
                         Last error: {}",
                        desc, elapsed, attempt, e
                    );
                }

                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn succeeds_immediately() {
        let value = assert_eventually(
            "immediate success",
            Duration::from_secs(1),
            Duration::from_millis(50),
            || async { Ok::<_, &str>(42) },
        )
        .await;
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn succeeds_after_retries() {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);

        let result = assert_eventually(
            "counter to reach 3",
            Duration::from_secs(2),
            Duration::from_millis(20),
            move || {
                let c = Arc::clone(&counter_clone);
                async move {
                    let val = c.fetch_add(1, Ordering::SeqCst);
                    if val >= 2 {
                        Ok(val)
                    } else {
                        Err(format!("counter only at {}", val))
                    }
                }
            },
        )
        .await;

        assert!(result >= 2);
    }

    #[tokio::test]
    #[should_panic(expected = "Timeout waiting for never succeeds")]
    async fn panics_on_timeout() {
        assert_eventually(
            "never succeeds",
            Duration::from_millis(200),
            Duration::from_millis(50),
            || async { Err::<(), _>("always fails") },
        )
        .await;
    }
}
